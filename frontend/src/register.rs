use gloo_net::http::Request;
use web_sys::{File, FormData, HtmlInputElement, Url};
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{models::Participant, error::ErrorResponse, validation::MAX_NAME_LENGTH};
use crate::{styles::*, Route};
use crate::config::CONFIG;

#[derive(Default)]
pub struct FormState {
    name: String,
    photo: Option<File>,
    preview_url: Option<String>,
    error: Option<String>,
    submitting: bool,
}

pub struct Register {
    state: FormState,
    navigator: Option<Navigator>,
}

pub enum Msg {
    UpdateName(String),
    PhotoSelected(Option<File>),
    Submit,
    SubmitResult(Result<Participant, String>),
}

impl Component for Register {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            state: FormState::default(),
            navigator: ctx.link().navigator(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UpdateName(name) => {
                self.state.name = name;
                true
            },
            Msg::PhotoSelected(file) => {
                self.release_preview();
                self.state.preview_url = file.as_ref()
                    .and_then(|f| Url::create_object_url_with_blob(f).ok());
                self.state.photo = file;
                true
            },
            Msg::Submit => {
                let Some(photo) = self.state.photo.clone().filter(|_| !self.state.name.is_empty()) else {
                    self.state.error = Some("Please provide both name and photo".into());
                    return true;
                };

                self.state.submitting = true;
                self.state.error = None;

                let name = self.state.name.clone();
                ctx.link().send_future(async move {
                    Msg::SubmitResult(submit_registration(name, photo).await)
                });
                true
            },
            Msg::SubmitResult(result) => match result {
                Ok(_) => {
                    if let Some(navigator) = &self.navigator {
                        navigator.push(&Route::Vote);
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
        let on_name = ctx.link().callback(|e: InputEvent| {
            Msg::UpdateName(e.target_unchecked_into::<HtmlInputElement>().value())
        });
        let on_photo = ctx.link().callback(|e: Event| {
            let input = e.target_unchecked_into::<HtmlInputElement>();
            Msg::PhotoSelected(input.files().and_then(|files| files.get(0)))
        });
        let on_submit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        html! {
            <div class={BG_PAGE}>
                <div class={CARD}>
                    <h1 class={HEADING_LG}>{"Register Your Costume"}</h1>
                    {if let Some(error) = &self.state.error {
                        html! { <div class={alert_style("error")}>{error}</div> }
                    } else { html! {} }}
                    <form onsubmit={on_submit} class={SPACE_Y_LG}>
                        <div class={SPACE_Y_BASE}>
                            <label for="name" class={TEXT_LABEL}>{"Your Name"}</label>
                            <input
                                id="name"
                                type="text"
                                class={INPUT_BASE}
                                maxlength={MAX_NAME_LENGTH.to_string()}
                                value={self.state.name.clone()}
                                oninput={on_name}
                                disabled={self.state.submitting}
                            />
                        </div>
                        <div class={SPACE_Y_BASE}>
                            <label for="photo" class={TEXT_LABEL}>{"Costume Photo"}</label>
                            <input
                                id="photo"
                                type="file"
                                accept="image/*"
                                class={INPUT_BASE}
                                onchange={on_photo}
                                disabled={self.state.submitting}
                            />
                            {if let Some(url) = &self.state.preview_url {
                                html! {
                                    <img src={url.clone()} alt="Costume preview"
                                        class="mt-4 w-full max-h-80 object-cover rounded-lg" />
                                }
                            } else { html! {} }}
                        </div>
                        <button type="submit" class={button_primary(true)} disabled={self.state.submitting}>
                            {if self.state.submitting { "Registering..." } else { "Register" }}
                        </button>
                    </form>
                </div>
            </div>
        }
    }

    fn destroy(&mut self, _: &Context<Self>) {
        self.release_preview();
    }
}

impl Register {
    fn release_preview(&mut self) {
        if let Some(url) = self.state.preview_url.take() {
            let _ = Url::revoke_object_url(&url);
        }
    }
}

async fn submit_registration(name: String, photo: File) -> Result<Participant, String> {
    let form = FormData::new().map_err(|_| "Failed to build upload".to_string())?;
    form.append_with_str("name", &name)
        .and_then(|_| form.append_with_blob_and_filename("photo", &photo, &photo.name()))
        .map_err(|_| "Failed to build upload".to_string())?;

    let response = Request::post(&format!("{}/participants", CONFIG.api_base_url))
        .body(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    match response.status() {
        200 => response.json::<Participant>().await.map_err(|e| e.to_string()),
        413 => Err("Photo is too large".into()),
        _ => Err(response.json::<ErrorResponse>().await
            .map(|err| err.error)
            .unwrap_or_else(|_| "Failed to create participant".into())),
    }
}
