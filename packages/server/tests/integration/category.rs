use reqwest::multipart::Form;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use server::entity::{product, variant};

use crate::common::{TestApp, png_part, product_form, routes};

#[tokio::test]
async fn create_category_stores_image_under_derived_folder() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .text("name", "Coffee Mugs")
        .text("description", "Mugs of all kinds")
        .part("image", png_part("cover.png"));
    let res = app.post_multipart(routes::CATEGORYS, form).await;

    assert_eq!(res.status, 201, "{}", res.text);
    let id = res.id();

    let image = res.body["image"].as_str().expect("image reference");
    assert!(
        image.starts_with(&format!("categorys/coffee-mugs-{id}/")),
        "unexpected image path: {image}"
    );
    assert!(app.media_file_exists(image));

    // The file is served back over the media route.
    let media = app.get_raw(&routes::media(image)).await;
    assert_eq!(media.status().as_u16(), 200);
    assert_eq!(
        media.bytes().await.unwrap().as_ref(),
        &b"not-really-a-png"[..]
    );
}

#[tokio::test]
async fn get_category_includes_its_products() {
    let app = TestApp::spawn().await;
    let category_id = app.create_category("Mugs").await;
    let product_res = app.create_product(category_id, "Blue Mug").await;

    let res = app.get(&routes::category(category_id)).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let products = res.body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], product_res.body["id"]);
    assert_eq!(products[0]["name"], "Blue Mug");
}

#[tokio::test]
async fn update_category_replaces_the_stored_image() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .text("name", "Mugs")
        .part("image", png_part("old.png"));
    let created = app.post_multipart(routes::CATEGORYS, form).await;
    assert_eq!(created.status, 201, "{}", created.text);
    let id = created.id();
    let old_image = created.body["image"].as_str().unwrap().to_string();

    let form = Form::new()
        .text("name", "Mugs")
        .part("image", png_part("new.png"));
    let updated = app.patch_multipart(&routes::category(id), form).await;
    assert_eq!(updated.status, 200, "{}", updated.text);

    let new_image = updated.body["image"].as_str().unwrap().to_string();
    assert_ne!(old_image, new_image);
    assert!(!app.media_file_exists(&old_image), "old image not deleted");
    assert!(app.media_file_exists(&new_image), "new image not written");
}

#[tokio::test]
async fn update_category_can_remove_the_image() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .text("name", "Mugs")
        .part("image", png_part("cover.png"));
    let created = app.post_multipart(routes::CATEGORYS, form).await;
    let id = created.id();
    let image = created.body["image"].as_str().unwrap().to_string();

    let form = Form::new().text("name", "Mugs").text("remove_image", "true");
    let updated = app.patch_multipart(&routes::category(id), form).await;

    assert_eq!(updated.status, 200, "{}", updated.text);
    assert!(updated.body["image"].is_null());
    assert!(!app.media_file_exists(&image));
}

#[tokio::test]
async fn renaming_a_category_redirects_new_writes() {
    let app = TestApp::spawn().await;

    let form = Form::new()
        .text("name", "Mugs")
        .part("image", png_part("cover.png"));
    let created = app.post_multipart(routes::CATEGORYS, form).await;
    let id = created.id();

    let form = Form::new()
        .text("name", "Cups")
        .part("image", png_part("fresh.png"));
    let updated = app.patch_multipart(&routes::category(id), form).await;
    assert_eq!(updated.status, 200, "{}", updated.text);

    let new_image = updated.body["image"].as_str().unwrap();
    assert!(
        new_image.starts_with(&format!("categorys/cups-{id}/")),
        "write folder should derive from the new name: {new_image}"
    );
    assert!(app.media_file_exists(new_image));
}

#[tokio::test]
async fn delete_category_cascades_rows_and_folder() {
    let app = TestApp::spawn().await;
    let category_id = app.create_category("Mugs").await;

    let form = product_form(category_id, "Blue Mug")
        .part("images", png_part("a.png"))
        .text("variants", r#"[{"name": "S", "price": "9.99"}]"#)
        .part("variant_image:new:0", png_part("s.png"));
    let created = app.post_multipart(routes::PRODUCTS, form).await;
    assert_eq!(created.status, 201, "{}", created.text);
    let product_image = created.images()[0].clone();
    assert!(app.media_file_exists(&product_image));

    let deleted = app.delete(&routes::category(category_id)).await;
    assert_eq!(deleted.status, 200, "{}", deleted.text);
    assert_eq!(deleted.body["id"].as_i64().unwrap() as i32, category_id);

    // Every file under the category folder is gone, and no orphan rows
    // remain.
    assert!(!app.media_file_exists(&product_image));
    assert!(!app.media_file_exists(&format!("categorys/mugs-{category_id}")));

    let product_count = product::Entity::find()
        .filter(product::Column::CategoryId.eq(category_id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(product_count, 0);
    let variant_count = variant::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(variant_count, 0);

    let res = app.get(&routes::category(category_id)).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn missing_category_is_404() {
    let app = TestApp::spawn().await;
    let res = app.get(&routes::category(9999)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn category_without_name_is_rejected() {
    let app = TestApp::spawn().await;
    let form = Form::new().text("description", "nameless");
    let res = app.post_multipart(routes::CATEGORYS, form).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
