//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the schema wrappers from [`crate::inbound::http::schemas`], so the
//! document describes the wire format without coupling domain types to
//! utoipa. Routes default to bearer authentication; public routes opt out
//! with an empty `security` list.
//!
//! The document backs Swagger UI in debug builds and is printed by the
//! `openapi-dump` binary.

use crate::inbound::http::schemas::{
    BootcampInputSchema, BootcampSchema, CourseInputSchema, CourseSchema, ErrorCodeSchema,
    ErrorEnvelopeSchema, ForgotPasswordSchema, LocationSchema, LoginRequestSchema, PageRefSchema,
    PaginationSchema, PasswordChangeSchema, ResetPasswordSchema, ReviewInputSchema, ReviewSchema,
    TokenResponseSchema, UserDraftSchema, UserPatchSchema, UserSchema,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer token security scheme.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by login or register. The `token` cookie is also accepted.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DevCamper API",
        description = "Bootcamp directory with courses, reviews and token-authenticated publishing."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::auth::update_details,
        crate::inbound::http::auth::update_password,
        crate::inbound::http::auth::forgot_password,
        crate::inbound::http::auth::reset_password,
        crate::inbound::http::bootcamps::list_bootcamps,
        crate::inbound::http::bootcamps::bootcamps_in_radius,
        crate::inbound::http::bootcamps::get_bootcamp,
        crate::inbound::http::bootcamps::create_bootcamp,
        crate::inbound::http::bootcamps::update_bootcamp,
        crate::inbound::http::bootcamps::delete_bootcamp,
        crate::inbound::http::bootcamps::upload_bootcamp_photo,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::list_bootcamp_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::add_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::list_bootcamp_reviews,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::add_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorCodeSchema,
        ErrorEnvelopeSchema,
        PageRefSchema,
        PaginationSchema,
        UserSchema,
        LocationSchema,
        BootcampSchema,
        CourseSchema,
        ReviewSchema,
        TokenResponseSchema,
        UserDraftSchema,
        LoginRequestSchema,
        UserPatchSchema,
        PasswordChangeSchema,
        ForgotPasswordSchema,
        ResetPasswordSchema,
        BootcampInputSchema,
        CourseInputSchema,
        ReviewInputSchema,
    )),
    tags(
        (name = "auth", description = "Registration, sign-in and password management"),
        (name = "bootcamps", description = "Bootcamp directory and radius search"),
        (name = "courses", description = "Courses offered by bootcamps"),
        (name = "reviews", description = "User reviews of bootcamps"),
        (name = "users", description = "User administration (admin only)"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying registered paths, schemas and security.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("ErrorEnvelope", "code")]
    #[case("ErrorEnvelope", "traceId")]
    #[case("User", "email")]
    #[case("Bootcamp", "averageCost")]
    #[case("Course", "minimumSkill")]
    #[case("Review", "rating")]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema"));
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/bootcamps")]
    #[case("/api/v1/bootcamps/radius/{zipcode}/{distance}")]
    #[case("/api/v1/bootcamps/{id}/courses")]
    #[case("/api/v1/auth/resetpassword/{resettoken}")]
    #[case("/api/v1/users/{id}")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    #[case("/api/v1/bootcamps/{id}")]
    #[case("/api/v1/reviews/{id}")]
    fn deletes_answer_ok_with_an_empty_data_object(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get(path)
            .unwrap_or_else(|| panic!("missing {path}"));
        let responses = &item.delete.as_ref().expect("delete operation").responses.responses;
        assert!(!responses.contains_key("204"));
        let Some(RefOr::T(ok)) = responses.get("200") else {
            panic!("inline 200 response for {path}");
        };
        assert!(ok.description.contains("`{success: true, data: {}}`"));
        assert!(ok.description.contains("no status field"));
    }

    #[test]
    fn review_updates_answer_ok() {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get("/api/v1/reviews/{id}")
            .expect("review path");
        let responses = &item.put.as_ref().expect("put operation").responses.responses;
        assert!(responses.contains_key("200"));
        assert!(!responses.contains_key("201"));
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
