//! View contexts and pagination.

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};

use common::{Fixture, rendered};
use web_server::build_app;

#[actix_web::test]
async fn test_index_lists_first_post() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    let context = rendered(&resp).context;

    let first = &context["page_obj"]["object_list"][0];
    assert_eq!(first["text"], "Test post text");
    assert_eq!(first["author"]["username"], "auth");
    assert_eq!(first["group"]["slug"], "test-slug");
    assert_eq!(context["user"], serde_json::Value::Null);
    assert!(context["year"].is_number());
}

#[actix_web::test]
async fn test_group_page_context() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::get().uri("/group/test-slug/").to_request();
    let resp = test::call_service(&app, req).await;
    let context = rendered(&resp).context;

    assert_eq!(context["group"]["title"], "Test group");
    assert_eq!(context["group"]["description"], "Test description");
    assert_eq!(context["page_obj"]["object_list"][0]["id"], fx.post.id);
}

#[actix_web::test]
async fn test_profile_page_context() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::get().uri("/profile/auth/").to_request();
    let resp = test::call_service(&app, req).await;
    let context = rendered(&resp).context;

    assert_eq!(context["author"]["username"], "auth");
    assert_eq!(context["author"]["full_name"], "Leo Tolstoy");
    assert_eq!(context["post_count"], 1);
    assert_eq!(context["page_obj"]["object_list"][0]["text"], "Test post text");
}

#[actix_web::test]
async fn test_detail_page_context() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::get()
        .uri(&format!("/posts/{}/", fx.post.id))
        .cookie(fx.session(&fx.author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let context = rendered(&resp).context;

    assert_eq!(context["post"]["id"], fx.post.id);
    assert_eq!(context["post"]["text"], "Test post text");
    assert_eq!(context["author_post_count"], 1);
    assert_eq!(context["can_edit"], true);
    assert_eq!(context["user"]["username"], "auth");
}

#[actix_web::test]
async fn test_post_text_is_escaped() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::post()
        .uri("/create/")
        .cookie(fx.session(&fx.author))
        .set_form(yatube_shared::dto::PostFormData {
            text: "<script>alert(1)</script>\nsecond line".to_string(),
            group: String::new(),
        })
        .to_request();
    test::call_service(&app, req).await;

    let body = test::call_and_read_body(&app, TestRequest::get().uri("/").to_request()).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("&lt;script&gt;alert(1)&lt;&#x2F;script&gt;<br>second line"));
    assert!(!html.contains("<script>alert(1)"));
}

#[actix_web::test]
async fn test_listings_paginate_by_ten() {
    let fx = Fixture::new().await;
    // 12 more in the group make 13 in total.
    fx.add_posts(12, Some(fx.group.id)).await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    for base in ["/", "/group/test-slug/", "/profile/auth/"] {
        for (page, expected) in [("1", 10), ("2", 3)] {
            let uri = format!("{base}?page={page}");
            let resp = test::call_service(&app, TestRequest::get().uri(&uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let page_obj = rendered(&resp).context["page_obj"].clone();
            assert_eq!(page_obj["object_list"].as_array().unwrap().len(), expected, "{uri}");
            assert_eq!(page_obj["count"], 13, "{uri}");
        }
    }
}

#[actix_web::test]
async fn test_newest_post_comes_first() {
    let fx = Fixture::new().await;
    fx.add_posts(2, None).await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    let list = rendered(&resp).context["page_obj"]["object_list"].clone();

    assert_eq!(list[0]["text"], "Post number 1");
    assert_eq!(list[2]["text"], "Test post text");
}

#[actix_web::test]
async fn test_out_of_range_page_shows_last_page() {
    let fx = Fixture::new().await;
    fx.add_posts(12, None).await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    for (raw, number) in [("99", 2), ("abc", 1), ("0", 1)] {
        let uri = format!("/?page={raw}");
        let resp = test::call_service(&app, TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(rendered(&resp).context["page_obj"]["number"], number, "{uri}");
    }
}

#[actix_web::test]
async fn test_repeated_page_parameter_uses_last_value() {
    let fx = Fixture::new().await;
    fx.add_posts(12, None).await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::get().uri("/?page=1&page=2").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(rendered(&resp).context["page_obj"]["number"], 2);
}

#[actix_web::test]
async fn test_other_groups_page_does_not_show_post() {
    let fx = Fixture::new().await;
    yatube_core::ports::GroupRepository::create(
        &*fx.store,
        yatube_core::domain::NewGroup::new("Other group", "other-slug", ""),
    )
    .await
    .unwrap();
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::get().uri("/group/other-slug/").to_request();
    let resp = test::call_service(&app, req).await;
    let context = rendered(&resp).context;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(context["page_obj"]["object_list"].as_array().unwrap().is_empty());
    assert_eq!(context["page_obj"]["num_pages"], 1);
}
