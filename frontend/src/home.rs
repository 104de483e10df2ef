use yew::prelude::*;
use yew_router::prelude::*;
use crate::{Route, styles::*};

#[function_component]
pub fn Home() -> Html {
    html! {
        <div class={CONTAINER_SM}>
            <h1 class={combine_classes(HEADING_LG, "text-white")}>{"Halloween Vote"}</h1>
            <p class="text-center text-gray-300 mb-8">{"Vote for the best costume!"}</p>

            <div class="space-y-4 max-w-md mx-auto">
                <Link<Route> to={Route::Register} classes={classes!(combine_classes(BUTTON_LINK, BUTTON_PRIMARY))}>
                    {"Register Your Costume"}
                </Link<Route>>
                <Link<Route> to={Route::Vote} classes={classes!(combine_classes(BUTTON_LINK, BUTTON_OUTLINE))}>
                    {"Vote Now"}
                </Link<Route>>
                <Link<Route> to={Route::Results} classes={classes!(combine_classes(BUTTON_LINK, BUTTON_OUTLINE))}>
                    {"View Results"}
                </Link<Route>>
            </div>

            <div class="bg-gray-800 p-6 rounded-lg shadow-lg mt-10 max-w-md mx-auto">
                <h2 class="text-xl font-semibold mb-4 text-white">{"How it works"}</h2>
                <ul class="list-disc pl-6 space-y-3 text-gray-300">
                    <li>{"Register with your name and a photo of your costume"}</li>
                    <li>{"Everyone gets one vote, cast under their own name"}</li>
                    <li>{"Results update live every few seconds"}</li>
                </ul>
            </div>
        </div>
    }
}
