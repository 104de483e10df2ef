use gloo_net::http::Request;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{models::*, error::ErrorResponse, validation::MAX_VOTER_NAME_LENGTH};
use crate::{styles::*, Route};
use crate::config::CONFIG;

#[derive(Default)]
enum Load {
    #[default]
    Loading,
    Ready(Vec<Participant>),
    Error(String),
}

#[derive(Default)]
pub struct BallotState {
    participants: Load,
    selected: Option<String>,
    voter_name: String,
    error: Option<String>,
    submitting: bool,
}

pub struct VotePage {
    state: BallotState,
    navigator: Option<Navigator>,
}

pub enum Msg {
    ParticipantsLoaded(Result<Vec<Participant>, String>),
    Select(String),
    UpdateVoterName(String),
    Submit,
    SubmitResult(Result<Vote, String>),
}

impl Component for VotePage {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_future(async { Msg::ParticipantsLoaded(fetch_participants().await) });

        Self {
            state: BallotState::default(),
            navigator: ctx.link().navigator(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::ParticipantsLoaded(result) => {
                self.state.participants = match result {
                    Ok(participants) => Load::Ready(participants),
                    Err(error) => Load::Error(error),
                };
                true
            },
            Msg::Select(id) => {
                self.state.selected = Some(id);
                true
            },
            Msg::UpdateVoterName(name) => {
                self.state.voter_name = name;
                true
            },
            Msg::Submit => {
                let voter_name = self.state.voter_name.clone();
                let Some(voted_for) = self.state.selected.clone().filter(|_| !voter_name.is_empty()) else {
                    self.state.error = Some("Please select a costume and enter your name".into());
                    return true;
                };

                self.state.submitting = true;
                self.state.error = None;

                let request = CreateVoteRequest {
                    voter_name: Some(voter_name),
                    voted_for: Some(voted_for),
                };
                ctx.link().send_future(async move { Msg::SubmitResult(submit_vote(request).await) });
                true
            },
            Msg::SubmitResult(result) => match result {
                Ok(_) => {
                    if let Some(navigator) = &self.navigator {
                        navigator.push(&Route::Results);
                    }
                    false
                },
                Err(error) => {
                    self.state.error = Some(error);
                    self.state.submitting = false;
                    true
                },
            },
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match &self.state.participants {
            Load::Loading => html! {
                <div class={CONTAINER}>
                    <div class="flex items-center justify-center p-8">
                        <div class="animate-spin rounded-full h-12 w-12 border-4 border-orange-500 border-t-transparent"/>
                    </div>
                </div>
            },
            Load::Error(error) => html! {
                <div class={CONTAINER}>
                    <div class={alert_style("error")}>{error}</div>
                </div>
            },
            Load::Ready(participants) if participants.is_empty() => html! {
                <div class={CONTAINER}>
                    <h1 class={HEADING_LG}>{"Vote for the Best Costume"}</h1>
                    <div class={alert_style("info")}>
                        <p>{"No costumes have been registered yet."}</p>
                        <Link<Route> to={Route::Register} classes={classes!(button_primary(false), "inline-block", "mt-4")}>
                            {"Register a Costume"}
                        </Link<Route>>
                    </div>
                </div>
            },
            Load::Ready(participants) => self.render_ballot(ctx, participants),
        }
    }
}

impl VotePage {
    fn render_ballot(&self, ctx: &Context<Self>, participants: &[Participant]) -> Html {
        let on_name = ctx.link().callback(|e: InputEvent| {
            Msg::UpdateVoterName(e.target_unchecked_into::<HtmlInputElement>().value())
        });
        let on_submit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class={CONTAINER}>
                <h1 class={HEADING_LG}>{"Vote for the Best Costume"}</h1>
                {if let Some(error) = &self.state.error {
                    html! { <div class={alert_style("error")}>{error}</div> }
                } else { html! {} }}
                <form onsubmit={on_submit} class={SPACE_Y_LG}>
                    <div class="grid grid-cols-1 sm:grid-cols-2 md:grid-cols-3 gap-4">
                        {for participants.iter().map(|p| self.render_option(ctx, p))}
                    </div>
                    <div class={SPACE_Y_BASE}>
                        <label for="voter-name" class={TEXT_LABEL}>{"Your Name"}</label>
                        <input
                            id="voter-name"
                            type="text"
                            class={INPUT_BASE}
                            maxlength={MAX_VOTER_NAME_LENGTH.to_string()}
                            value={self.state.voter_name.clone()}
                            oninput={on_name}
                            disabled={self.state.submitting}
                        />
                        <p class={TEXT_MUTED}>{"Each name can vote once."}</p>
                    </div>
                    <button type="submit" class={button_primary(true)} disabled={self.state.submitting}>
                        {if self.state.submitting { "Submitting..." } else { "Submit Vote" }}
                    </button>
                </form>
            </div>
        }
    }

    fn render_option(&self, ctx: &Context<Self>, participant: &Participant) -> Html {
        let selected = self.state.selected.as_deref() == Some(participant.id.as_str());
        let id = participant.id.clone();
        let onclick = ctx.link().callback(move |_| Msg::Select(id.clone()));

        html! {
            <button type="button" {onclick} disabled={self.state.submitting}
                class={classes!(
                    "bg-gray-800", "rounded-lg", "overflow-hidden", "border-2", "transition-colors", "text-left",
                    if selected { "border-orange-500" } else { "border-gray-700 hover:border-gray-500" }
                )}>
                <img src={participant.photo_url().to_string()} alt={participant.name.clone()}
                    class="w-full h-48 object-cover" />
                <p class="p-3 text-gray-100 font-semibold truncate">{&participant.name}</p>
            </button>
        }
    }
}

async fn fetch_participants() -> Result<Vec<Participant>, String> {
    let response = Request::get(&format!("{}/participants", CONFIG.api_base_url))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.ok() {
        return Err(response.json::<ErrorResponse>().await
            .map(|err| err.error)
            .unwrap_or_else(|_| "Failed to fetch participants".into()));
    }
    response.json::<Vec<Participant>>().await
        .map_err(|_| "Failed to parse participants".to_string())
}

async fn submit_vote(request: CreateVoteRequest) -> Result<Vote, String> {
    let response = Request::post(&format!("{}/votes", CONFIG.api_base_url))
        .json(&request)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;

    match response.status() {
        200 => response.json::<Vote>().await.map_err(|e| e.to_string()),
        400 => Err(response.json::<ErrorResponse>().await
            .map(|err| err.error)
            .unwrap_or_else(|_| "Invalid request".into())),
        _ => Err(response.json::<ErrorResponse>().await
            .map(|err| err.error)
            .unwrap_or_else(|_| "Failed to create vote".into())),
    }
}
