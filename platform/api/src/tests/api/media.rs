use hyper::header::CONTENT_TYPE;
use hyper::StatusCode;
use serde_json::json;

use super::{assert_redirect, json_body, TestServer, GIF};
use crate::api::form::INVALID_IMAGE;
use crate::database::{Feed, Post};

async fn latest_post(server: &TestServer) -> Post {
	Feed::All
		.fetch(&server.global.db, 1, 0)
		.await
		.expect("failed to query posts")
		.pop()
		.expect("no posts")
}

#[tokio::test]
async fn test_upload_image() {
	let server = TestServer::start().await;
	let (_, token) = server.user("leo").await;

	let res = server
		.post_multipart(
			"/create/",
			Some(token.as_str()),
			&[("text", "Пост с картинкой")],
			Some(("image", "small.gif", GIF)),
		)
		.await;
	assert_redirect(&res, "/profile/leo/");

	let post = latest_post(&server).await;
	assert_eq!(post.image.as_deref(), Some("posts/small.gif"));

	let body = json_body(server.get("/", None).await).await;
	assert_eq!(body["page_obj"]["object_list"][0]["image"], "/media/posts/small.gif");

	let res = server.get("/media/posts/small.gif", None).await;
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(res.headers()[CONTENT_TYPE], "image/gif");
	let bytes = hyper::body::to_bytes(res.into_body()).await.expect("failed to read body");
	assert_eq!(&bytes[..], GIF);

	// The same name again is stored next to the first one.
	let res = server
		.post_multipart(
			"/create/",
			Some(token.as_str()),
			&[("text", "Ещё одна")],
			Some(("image", "small.gif", GIF)),
		)
		.await;
	assert_eq!(res.status(), StatusCode::FOUND);

	let second = latest_post(&server).await;
	let image = second.image.expect("second post has no image");
	assert_ne!(image, "posts/small.gif");
	assert!(image.starts_with("posts/small_") && image.ends_with(".gif"), "{image}");

	server.shutdown().await;
}

#[tokio::test]
async fn test_edit_keeps_image() {
	let server = TestServer::start().await;
	let (_, token) = server.user("leo").await;

	let res = server
		.post_multipart(
			"/create/",
			Some(token.as_str()),
			&[("text", "before")],
			Some(("image", "keep.gif", GIF)),
		)
		.await;
	assert_eq!(res.status(), StatusCode::FOUND);
	let post = latest_post(&server).await;

	let res = server
		.post_multipart(&format!("/posts/{}/edit/", post.id), Some(token.as_str()), &[("text", "after")], None)
		.await;
	assert_redirect(&res, &format!("/posts/{}/", post.id));

	let stored = latest_post(&server).await;
	assert_eq!(stored.text, "after");
	assert_eq!(stored.image.as_deref(), Some("posts/keep.gif"));

	server.shutdown().await;
}

#[tokio::test]
async fn test_upload_not_an_image() {
	let server = TestServer::start().await;
	let (_, token) = server.user("leo").await;

	let res = server
		.post_multipart(
			"/create/",
			Some(token.as_str()),
			&[("text", "text file")],
			Some(("image", "notes.txt", &b"just some text, not a picture"[..])),
		)
		.await;
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);

	let body = json_body(res).await;
	assert_eq!(body["form"]["errors"]["image"], json!([INVALID_IMAGE]));
	assert_eq!(Post::count(&server.global.db).await.expect("failed to count posts"), 0);

	server.shutdown().await;
}

#[tokio::test]
async fn test_upload_too_large() {
	let server = TestServer::start_with(|config| config.media.max_image_size = 16).await;
	let (_, token) = server.user("leo").await;

	let res = server
		.post_multipart(
			"/create/",
			Some(token.as_str()),
			&[("text", "big")],
			Some(("image", "big.gif", GIF)),
		)
		.await;
	assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);

	server.shutdown().await;
}

#[tokio::test]
async fn test_missing_image() {
	let server = TestServer::start().await;

	for path in ["/media/posts/nothing.gif", "/media/posts/..hidden"] {
		let res = server.get(path, None).await;
		assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
	}

	server.shutdown().await;
}
