use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use rocket::http::Header;

/// Lets the frontend dev server on localhost call the API cross-origin.
pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(origin) = req.headers().get_one("Origin") else { return };

        if origin.starts_with("http://localhost") || origin.starts_with("http://127.0.0.1") {
            res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
            res.set_header(Header::new("Access-Control-Allow-Methods", "GET, POST, OPTIONS"));
            res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
        }
    }
}
