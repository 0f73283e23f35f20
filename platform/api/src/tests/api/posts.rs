use hyper::StatusCode;
use serde_json::json;

use super::{assert_redirect, json_body, TestServer};
use crate::api::form::{INVALID_CHOICE, REQUIRED};
use crate::database::{Comment, Group, Post, PostData};

#[tokio::test]
async fn test_create_post() {
	let server = TestServer::start().await;
	let (_, token) = server.user("leo").await;
	let group = Group::create(&server.global.db, "Тестовая группа", "test-slug", "Тестовое описание")
		.await
		.expect("failed to create group");

	let group_id = group.id.to_string();

	let before = Post::count(&server.global.db).await.expect("failed to count posts");

	let res = server
		.post_form(
			"/create/",
			Some(token.as_str()),
			&[("text", "Тестовый пост"), ("group", group_id.as_str())],
		)
		.await;
	assert_redirect(&res, "/profile/leo/");

	assert_eq!(Post::count(&server.global.db).await.expect("failed to count posts"), before + 1);

	let body = json_body(server.get("/group/test-slug/", None).await).await;
	let post = &body["page_obj"]["object_list"][0];
	assert_eq!(post["text"], "Тестовый пост");
	assert_eq!(post["author"]["username"], "leo");
	assert_eq!(post["group"]["slug"], "test-slug");

	server.shutdown().await;
}

#[tokio::test]
async fn test_create_form() {
	let server = TestServer::start().await;
	let (_, token) = server.user("leo").await;
	let group = Group::create(&server.global.db, "Cats", "cats", "")
		.await
		.expect("failed to create group");

	let res = server.get("/create/", Some(token.as_str())).await;
	assert_eq!(res.status(), StatusCode::OK);

	let body = json_body(res).await;
	assert_eq!(body["is_edit"], false);
	assert_eq!(body["form"]["fields"]["text"]["required"], true);
	assert_eq!(body["form"]["fields"]["group"]["required"], false);
	assert_eq!(
		body["form"]["fields"]["group"]["choices"],
		json!([{ "id": group.id, "title": "Cats" }])
	);
	assert_eq!(body["form"]["errors"], json!({}));

	server.shutdown().await;
}

#[tokio::test]
async fn test_create_invalid() {
	let server = TestServer::start().await;
	let (_, token) = server.user("leo").await;

	let res = server.post_form("/create/", Some(token.as_str()), &[("text", "   ")]).await;
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	let body = json_body(res).await;
	assert_eq!(body["form"]["errors"]["text"], json!([REQUIRED]));

	let res = server
		.post_form("/create/", Some(token.as_str()), &[("text", "fine"), ("group", "9999")])
		.await;
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	let body = json_body(res).await;
	assert_eq!(body["form"]["errors"]["group"], json!([INVALID_CHOICE]));
	// Submitted values are echoed back.
	assert_eq!(body["form"]["fields"]["text"]["value"], "fine");

	assert_eq!(Post::count(&server.global.db).await.expect("failed to count posts"), 0);

	server.shutdown().await;
}

#[tokio::test]
async fn test_guest_redirects() {
	let server = TestServer::start().await;
	let (author, _) = server.user("leo").await;
	let post = Post::create(
		&server.global.db,
		author.id,
		&PostData {
			text: "original".to_string(),
			..Default::default()
		},
	)
	.await
	.expect("failed to create post");

	let res = server.get("/create/", None).await;
	assert_redirect(&res, "/auth/login/?next=/create/");

	let res = server.post_form("/create/", None, &[("text", "sneaky")]).await;
	assert_redirect(&res, "/auth/login/?next=/create/");

	let edit = format!("/posts/{}/edit/", post.id);
	let res = server.post_form(&edit, None, &[("text", "changed")]).await;
	assert_redirect(&res, &format!("/auth/login/?next={edit}"));

	assert_eq!(Post::count(&server.global.db).await.expect("failed to count posts"), 1);
	let stored = Post::by_id(&server.global.db, post.id)
		.await
		.expect("failed to query post")
		.expect("post is missing");
	assert_eq!(stored.text, "original");

	server.shutdown().await;
}

#[tokio::test]
async fn test_edit_post() {
	let server = TestServer::start().await;
	let (author, token) = server.user("leo").await;
	let (_, other_token) = server.user("max").await;
	let group = Group::create(&server.global.db, "Cats", "cats", "")
		.await
		.expect("failed to create group");

	let post = Post::create(
		&server.global.db,
		author.id,
		&PostData {
			text: "original".to_string(),
			group_id: Some(group.id),
			image: None,
		},
	)
	.await
	.expect("failed to create post");
	let edit = format!("/posts/{}/edit/", post.id);
	let detail = format!("/posts/{}/", post.id);

	// The form comes back filled in.
	let res = server.get(&edit, Some(token.as_str())).await;
	assert_eq!(res.status(), StatusCode::OK);
	let body = json_body(res).await;
	assert_eq!(body["is_edit"], true);
	assert_eq!(body["post_id"], post.id);
	assert_eq!(body["form"]["fields"]["text"]["value"], "original");
	assert_eq!(body["form"]["fields"]["group"]["value"], group.id.to_string());

	// Someone else is sent to the post and nothing changes.
	let res = server.get(&edit, Some(other_token.as_str())).await;
	assert_redirect(&res, &detail);
	let res = server.post_form(&edit, Some(other_token.as_str()), &[("text", "hijacked")]).await;
	assert_redirect(&res, &detail);

	let stored = Post::by_id(&server.global.db, post.id)
		.await
		.expect("failed to query post")
		.expect("post is missing");
	assert_eq!(stored.text, "original");

	let res = server.post_form(&edit, Some(token.as_str()), &[("text", "edited")]).await;
	assert_redirect(&res, &detail);

	let stored = Post::by_id(&server.global.db, post.id)
		.await
		.expect("failed to query post")
		.expect("post is missing");
	assert_eq!(stored.text, "edited");
	assert_eq!(stored.group_id, None);
	assert_eq!(stored.pub_date, post.pub_date);

	let res = server.get("/posts/9999/edit/", Some(token.as_str())).await;
	assert_eq!(res.status(), StatusCode::NOT_FOUND);

	server.shutdown().await;
}

#[tokio::test]
async fn test_edit_invalid() {
	let server = TestServer::start().await;
	let (author, token) = server.user("leo").await;
	let group = Group::create(&server.global.db, "Cats", "cats", "")
		.await
		.expect("failed to create group");

	let post = Post::create(
		&server.global.db,
		author.id,
		&PostData {
			text: "original".to_string(),
			group_id: Some(group.id),
			image: None,
		},
	)
	.await
	.expect("failed to create post");
	let edit = format!("/posts/{}/edit/", post.id);

	let res = server.post_form(&edit, Some(token.as_str()), &[("text", "  ")]).await;
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	let body = json_body(res).await;
	assert_eq!(body["is_edit"], true);
	assert_eq!(body["post_id"], post.id);
	assert_eq!(body["form"]["errors"]["text"], json!([REQUIRED]));

	let res = server
		.post_form(&edit, Some(token.as_str()), &[("text", "edited"), ("group", "9999")])
		.await;
	assert_eq!(res.status(), StatusCode::BAD_REQUEST);
	let body = json_body(res).await;
	assert_eq!(body["is_edit"], true);
	assert_eq!(body["form"]["errors"]["group"], json!([INVALID_CHOICE]));
	assert_eq!(body["form"]["fields"]["text"]["value"], "edited");

	let stored = Post::by_id(&server.global.db, post.id)
		.await
		.expect("failed to query post")
		.expect("post is missing");
	assert_eq!(stored.text, "original");
	assert_eq!(stored.group_id, Some(group.id));
	assert_eq!(stored.pub_date, post.pub_date);

	server.shutdown().await;
}

#[tokio::test]
async fn test_post_detail_and_comments() {
	let server = TestServer::start().await;
	let (author, token) = server.user("leo").await;
	let post = Post::create(
		&server.global.db,
		author.id,
		&PostData {
			text: "commentable".to_string(),
			..Default::default()
		},
	)
	.await
	.expect("failed to create post");
	let detail = format!("/posts/{}/", post.id);
	let comment = format!("/posts/{}/comment/", post.id);

	let res = server.post_form(&comment, None, &[("text", "anonymous")]).await;
	assert_redirect(&res, &format!("/auth/login/?next={comment}"));
	assert!(Comment::for_post(&server.global.db, post.id)
		.await
		.expect("failed to query comments")
		.is_empty());

	let res = server.post_form(&comment, Some(token.as_str()), &[("text", "first")]).await;
	assert_redirect(&res, &detail);
	let res = server.post_form(&comment, Some(token.as_str()), &[("text", "second")]).await;
	assert_redirect(&res, &detail);

	// A blank comment is dropped but still redirects.
	let res = server.post_form(&comment, Some(token.as_str()), &[("text", "")]).await;
	assert_redirect(&res, &detail);

	let res = server.get(&detail, None).await;
	assert_eq!(res.status(), StatusCode::OK);
	let body = json_body(res).await;
	assert_eq!(body["post"]["text"], "commentable");
	assert_eq!(body["posts_count"], 1);
	let comments: Vec<&str> = body["comments"]
		.as_array()
		.expect("comments is not a list")
		.iter()
		.map(|comment| comment["text"].as_str().expect("comment has no text"))
		.collect();
	assert_eq!(comments, vec!["second", "first"]);
	assert_eq!(body["comments"][0]["author"]["username"], "leo");
	assert_eq!(body["form"]["fields"]["text"]["required"], true);

	let res = server.post_form("/posts/9999/comment/", Some(token.as_str()), &[("text", "lost")]).await;
	assert_eq!(res.status(), StatusCode::NOT_FOUND);

	server.shutdown().await;
}
