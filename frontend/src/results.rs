use yew::prelude::*;
use yew_router::prelude::*;
use gloo_net::http::Request;
use gloo_timers::callback::Interval;
use futures::try_join;
use shared::{models::*, rank};
use time::OffsetDateTime;
use std::rc::Rc;
use crate::{Route, styles::*};
use crate::config::CONFIG;

#[derive(Clone, Default)]
pub struct ResultsState {
    ranking: Option<Vec<RankedParticipant>>,
    error: Option<String>,
    updated_at: Option<OffsetDateTime>,
}

impl Reducible for ResultsState {
    type Action = Msg;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            Msg::Loaded(ranking) => {
                next.ranking = Some(ranking);
                next.error = None;
                next.updated_at = Some(OffsetDateTime::now_utc());
            },
            // A failed refresh keeps the last good ranking on screen.
            Msg::Error(error) => {
                next.error = Some(error);
            },
        }
        Rc::new(next)
    }
}

pub enum Msg {
    Loaded(Vec<RankedParticipant>),
    Error(String),
}

fn refresh(state: UseReducerHandle<ResultsState>) {
    wasm_bindgen_futures::spawn_local(async move {
        match fetch_results().await {
            Ok(ranking) => state.dispatch(Msg::Loaded(ranking)),
            Err(error) => state.dispatch(Msg::Error(error)),
        }
    });
}

#[function_component]
pub fn Results() -> Html {
    let state = use_reducer(ResultsState::default);

    use_effect_with_deps({
        let state = state.clone();
        move |_| {
            refresh(state.clone());
            let interval = Interval::new(CONFIG.results_poll_ms, move || refresh(state.clone()));
            move || drop(interval)
        }
    }, ());

    let on_refresh = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| refresh(state.clone()))
    };

    html! {
        <div class={CONTAINER}>
            <h1 class={HEADING_LG}>{"Live Results"}</h1>
            {if let Some(at) = state.updated_at {
                html! {
                    <p class={combine_classes(TEXT_MUTED, "text-center mb-6")}>
                        {format!("Updated {:02}:{:02}:{:02} UTC", at.hour(), at.minute(), at.second())}
                    </p>
                }
            } else { html! {} }}
            {if let Some(error) = &state.error {
                html! { <div class={alert_style("error")}>{error}</div> }
            } else { html! {} }}
            {match &state.ranking {
                None if state.error.is_none() => html! {
                    <div class="flex items-center justify-center p-8">
                        <div class="animate-spin rounded-full h-12 w-12 border-4 border-orange-500 border-t-transparent"/>
                    </div>
                },
                None => html! {},
                Some(ranking) if ranking.is_empty() => html! {
                    <div class={alert_style("info")}>
                        <p>{"No costumes registered yet."}</p>
                        <Link<Route> to={Route::Register} classes={classes!(button_primary(false), "inline-block", "mt-4")}>
                            {"Register a Costume"}
                        </Link<Route>>
                    </div>
                },
                Some(ranking) => html! {
                    <div class={SPACE_Y_BASE}>
                        {for ranking.iter().map(render_row)}
                    </div>
                },
            }}
            <div class="flex justify-center gap-4 mt-8">
                <button type="button" class={button_primary(false)} onclick={on_refresh}>
                    {"Refresh"}
                </button>
                <Link<Route> to={Route::Vote} classes={classes!(combine_classes(BUTTON_BASE, BUTTON_OUTLINE))}>
                    {"Vote Now"}
                </Link<Route>>
            </div>
        </div>
    }
}

fn rank_badge(rank: u32) -> String {
    match rank {
        1 => "🥇".into(),
        2 => "🥈".into(),
        3 => "🥉".into(),
        n => format!("#{}", n),
    }
}

fn render_row(entry: &RankedParticipant) -> Html {
    let leader = entry.rank == 1 && entry.vote_count > 0;
    html! {
        <div class={classes!(
            "flex", "items-center", "gap-4", "bg-gray-800", "rounded-lg", "p-4", "border",
            if leader { "border-orange-500" } else { "border-gray-700" }
        )}>
            <span class="w-12 text-center text-2xl font-bold text-gray-100">{rank_badge(entry.rank)}</span>
            <img src={entry.participant.photo_url().to_string()} alt={entry.participant.name.clone()}
                class="w-16 h-16 rounded-full object-cover" />
            <span class="flex-1 text-lg text-gray-100 font-semibold truncate">{&entry.participant.name}</span>
            <span class="text-orange-400 font-bold">
                {format!("{} {}", entry.vote_count, if entry.vote_count == 1 { "vote" } else { "votes" })}
            </span>
        </div>
    }
}

async fn fetch_results() -> Result<Vec<RankedParticipant>, String> {
    let failed = |_: gloo_net::Error| "Failed to load results".to_string();

    let (participants_resp, votes_resp) = try_join!(
        Request::get(&format!("{}/participants", CONFIG.api_base_url)).send(),
        Request::get(&format!("{}/votes", CONFIG.api_base_url)).send()
    ).map_err(failed)?;

    if !participants_resp.ok() || !votes_resp.ok() {
        return Err("Failed to load results".into());
    }

    let participants = participants_resp.json::<Vec<Participant>>().await.map_err(failed)?;
    let votes = votes_resp.json::<Vec<Vote>>().await.map_err(failed)?;

    Ok(rank(&participants, &votes))
}
