pub const CONTAINER: &str = "bg-gray-900 container mx-auto px-6 py-10 max-w-4xl rounded-xl shadow-lg mt-16";
pub const CONTAINER_SM: &str = "container mx-auto px-6 py-10 max-w-2xl rounded-xl shadow-lg mt-16";

pub const CARD: &str = "bg-gray-800 border border-gray-700 rounded-lg shadow-md p-6 max-w-xl mx-auto mt-16";
pub const ALERT_CARD: &str = "p-4 rounded-lg shadow-md mb-6";

pub const INPUT_BASE: &str = "appearance-none border border-gray-600 bg-gray-800 text-white text-lg rounded-md w-full py-2 px-4 focus:outline-none focus:border-orange-500";

pub const BUTTON_BASE: &str = "px-5 py-2 rounded-lg font-medium text-white transition-all duration-150 disabled:opacity-50 disabled:cursor-not-allowed";
pub const BUTTON_PRIMARY: &str = "bg-orange-600 hover:bg-orange-700 focus:ring-2 focus:ring-orange-400 focus:outline-none";
pub const BUTTON_OUTLINE: &str = "border-2 border-orange-500 text-orange-400 hover:bg-gray-800";
pub const BUTTON_FULL: &str = "w-full py-3 px-5 font-semibold rounded-lg transition-all duration-150 disabled:opacity-50 disabled:cursor-not-allowed mt-8";
pub const BUTTON_LINK: &str = "block w-full py-4 px-6 rounded-lg text-center text-lg font-semibold transition-colors";

pub const TEXT_LABEL: &str = "block text-sm font-semibold text-gray-200";
pub const TEXT_MUTED: &str = "text-sm text-gray-400";
pub const HEADING_LG: &str = "text-3xl font-extrabold mb-4 text-center text-gray-100";

pub const SPACE_Y_BASE: &str = "space-y-3";
pub const SPACE_Y_LG: &str = "space-y-6";

pub const BG_PAGE: &str = "bg-gray-900 min-h-screen";

pub fn combine_classes(base: &str, additional: &str) -> String {
    format!("{} {}", base, additional)
}

pub fn button_primary(full_width: bool) -> String {
    if full_width {
        combine_classes(BUTTON_BASE, &combine_classes(BUTTON_PRIMARY, BUTTON_FULL))
    } else {
        combine_classes(BUTTON_BASE, BUTTON_PRIMARY)
    }
}

pub fn alert_style(style: &str) -> String {
    match style {
        "error" => combine_classes(ALERT_CARD, "bg-red-500 text-white shadow-lg"),
        "success" => combine_classes(ALERT_CARD, "bg-green-500 text-white shadow-lg"),
        _ => combine_classes(ALERT_CARD, "bg-blue-500 text-white shadow-lg"),
    }
}
