//! Success envelopes: `{ success: true, data, count?, pagination? }`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{Error, Page, Pagination};

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
    data: T,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a single value.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            count: None,
            pagination: None,
            data,
        }
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    /// Wrap a list, reporting its length as `count`.
    pub fn counted(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            pagination: None,
            data: items,
        }
    }
}

/// `200 OK` with `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::data(data))
}

/// `201 Created` with `data`.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::build(StatusCode::CREATED).json(Envelope::data(data))
}

/// `200 OK` with an empty object, used by deletes and logout.
pub fn empty() -> HttpResponse {
    ok(Map::new())
}

/// `200 OK` with `count` and `data` for unpaginated lists.
pub fn counted<T: Serialize>(items: Vec<T>) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::counted(items))
}

/// `200 OK` for a page of the list contract, applying any `select`
/// projection.
pub fn page<T: Serialize>(page: Page<T>, select: Option<&[String]>) -> Result<HttpResponse, Error> {
    let items = page
        .items
        .iter()
        .map(|item| project(item, select))
        .collect::<Result<Vec<_>, _>>()?;
    let mut envelope = Envelope::counted(items);
    envelope.pagination = Some(page.pagination);
    Ok(HttpResponse::Ok().json(envelope))
}

/// Serialise `item`, keeping only `select`ed fields plus `id`.
fn project<T: Serialize>(item: &T, select: Option<&[String]>) -> Result<Value, Error> {
    let value = serde_json::to_value(item)
        .map_err(|err| Error::internal(format!("response serialisation failed: {err}")))?;
    let Some(fields) = select else {
        return Ok(value);
    };
    match value {
        Value::Object(map) => Ok(Value::Object(
            map.into_iter()
                .filter(|(key, _)| key == "id" || fields.iter().any(|field| field == key))
                .collect(),
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::PageRef;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Item {
        id: u32,
        name: &'static str,
        average_cost: u32,
    }

    async fn json_of(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[actix_web::test]
    async fn single_values_have_no_count() {
        let body = json_of(ok(json!({ "name": "Devworks" }))).await;
        assert_eq!(body, json!({ "success": true, "data": { "name": "Devworks" } }));
    }

    #[actix_web::test]
    async fn pages_carry_count_and_pagination() {
        let page = Page {
            items: vec![Item { id: 1, name: "Devworks", average_cost: 10_000 }],
            pagination: Pagination {
                next: Some(PageRef { page: 3, limit: 1 }),
                prev: Some(PageRef { page: 1, limit: 1 }),
            },
        };
        let body = json_of(super::page(page, None).expect("page")).await;
        assert_eq!(body["count"], json!(1));
        assert_eq!(body["pagination"]["next"], json!({ "page": 3, "limit": 1 }));
        assert_eq!(body["pagination"]["prev"], json!({ "page": 1, "limit": 1 }));
        assert_eq!(body["data"][0]["averageCost"], json!(10_000));
    }

    #[rstest]
    #[case(vec!["name"], json!({ "id": 1, "name": "Devworks" }))]
    #[case(vec!["averageCost"], json!({ "id": 1, "averageCost": 10_000 }))]
    fn projection_keeps_selected_fields_and_id(#[case] select: Vec<&str>, #[case] expected: Value) {
        let select: Vec<String> = select.into_iter().map(str::to_owned).collect();
        let item = Item { id: 1, name: "Devworks", average_cost: 10_000 };
        assert_eq!(project(&item, Some(&select)).expect("projected"), expected);
    }
}
