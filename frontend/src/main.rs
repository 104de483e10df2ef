use yew::prelude::*;
use yew_router::prelude::*;

mod styles;
mod home;
mod register;
mod vote;
mod results;
mod config;

use crate::{
    home::Home,
    register::Register,
    vote::VotePage,
    results::Results,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")] Home,
    #[at("/register")] Register,
    #[at("/vote")] Vote,
    #[at("/results")] Results,
}

fn nav_link(route: Route, label: &'static str, current: &Option<Route>) -> Html {
    let active = current.as_ref() == Some(&route);
    html! {
        <Link<Route> to={route} classes={classes!(
            "text-base", "md:text-lg", "font-medium", "px-4", "py-2", "rounded-md",
            "transition-colors", "duration-200", "ease-in-out",
            "text-gray-200", "border", "border-transparent", "hover:border-orange-400", "hover:text-orange-400",
            if active {
                "text-orange-400 border-orange-400 ring-2 ring-orange-500 ring-offset-1 ring-offset-gray-900"
            } else {
                ""
            }
        )}>
            {label}
        </Link<Route>>
    }
}

#[function_component(Navigation)]
fn navigation() -> Html {
    let current_route = use_route::<Route>();

    html! {
        <nav class="bg-gray-900 shadow-lg fixed top-0 w-full z-50">
            <div class="container mx-auto px-6 py-4 flex justify-center space-x-4 md:space-x-8">
                {nav_link(Route::Home, "Home", &current_route)}
                {nav_link(Route::Register, "Register", &current_route)}
                {nav_link(Route::Vote, "Vote", &current_route)}
                {nav_link(Route::Results, "Results", &current_route)}
            </div>
        </nav>
    }
}

#[function_component(App)]
fn app() -> Html {
    html! {
        <BrowserRouter>
            <div class="min-h-screen bg-gray-900">
                <Navigation />
                <div class="pt-16">
                    <Switch<Route> render={switch} />
                </div>
            </div>
        </BrowserRouter>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <Home /> },
        Route::Register => html! { <Register /> },
        Route::Vote => html! { <VotePage /> },
        Route::Results => html! { <Results /> },
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
