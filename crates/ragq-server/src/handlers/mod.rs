//! HTTP handlers. Each module owns one resource; [`routes`] collects
//! every `#[get]`/`#[post]`-annotated function into the list mounted by
//! [`crate::init::build`].

pub mod health;
pub mod knowledge;
pub mod query;
pub mod search;

/// Every route this crate serves, for `rocket::build().mount("/", routes())`.
pub fn routes() -> Vec<rocket::Route> {
    rocket::routes![
        health::live,
        health::ready,
        query::query,
        query::query_stream,
        search::search,
        knowledge::submit,
        knowledge::task_status,
    ]
}
