use hyper::StatusCode;

use super::{assert_redirect, json_body, page_texts, TestServer};
use crate::database::{Follow, Post, PostData};

async fn post(server: &TestServer, author_id: i64, text: &str) {
	Post::create(
		&server.global.db,
		author_id,
		&PostData {
			text: text.to_string(),
			..Default::default()
		},
	)
	.await
	.expect("failed to create post");
}

#[tokio::test]
async fn test_follow_feed() {
	let server = TestServer::start().await;
	let (author, _) = server.user("author").await;
	let (other, _) = server.user("other").await;
	let (reader, reader_token) = server.user("reader").await;
	let (_, stranger_token) = server.user("stranger").await;

	post(&server, author.id, "followed post").await;
	post(&server, other.id, "unfollowed post").await;

	for _ in 0..2 {
		let res = server
			.post_form("/profile/author/follow/", Some(reader_token.as_str()), &[])
			.await;
		assert_redirect(&res, "/profile/author/");
	}
	assert_eq!(Follow::count(&server.global.db).await.expect("failed to count follows"), 1);
	assert!(Follow::exists(&server.global.db, reader.id, author.id)
		.await
		.expect("failed to query follow"));

	let body = json_body(server.get("/follow/", Some(reader_token.as_str())).await).await;
	assert_eq!(page_texts(&body), vec!["followed post"]);

	// New posts by the followed author show up.
	post(&server, author.id, "fresh post").await;
	let body = json_body(server.get("/follow/", Some(reader_token.as_str())).await).await;
	assert_eq!(page_texts(&body), vec!["fresh post", "followed post"]);

	// Nobody else sees them.
	let body = json_body(server.get("/follow/", Some(stranger_token.as_str())).await).await;
	assert!(page_texts(&body).is_empty());

	let res = server
		.post_form("/profile/author/unfollow/", Some(reader_token.as_str()), &[])
		.await;
	assert_redirect(&res, "/profile/author/");
	assert_eq!(Follow::count(&server.global.db).await.expect("failed to count follows"), 0);

	let body = json_body(server.get("/follow/", Some(reader_token.as_str())).await).await;
	assert!(page_texts(&body).is_empty());

	// Unfollowing again is harmless.
	let res = server
		.post_form("/profile/author/unfollow/", Some(reader_token.as_str()), &[])
		.await;
	assert_redirect(&res, "/profile/author/");

	server.shutdown().await;
}

#[tokio::test]
async fn test_self_follow() {
	let server = TestServer::start().await;
	let (_, token) = server.user("narcissus").await;

	let res = server
		.post_form("/profile/narcissus/follow/", Some(token.as_str()), &[])
		.await;
	assert_redirect(&res, "/profile/narcissus/");
	assert_eq!(Follow::count(&server.global.db).await.expect("failed to count follows"), 0);

	server.shutdown().await;
}

#[tokio::test]
async fn test_follow_requires_login() {
	let server = TestServer::start().await;
	server.user("author").await;

	let res = server.post_form("/profile/author/follow/", None, &[]).await;
	assert_redirect(&res, "/auth/login/?next=/profile/author/follow/");
	assert_eq!(Follow::count(&server.global.db).await.expect("failed to count follows"), 0);

	let res = server.get("/follow/", None).await;
	assert_eq!(res.status(), StatusCode::OK);
	assert!(page_texts(&json_body(res).await).is_empty());

	let (_, token) = server.user("reader").await;
	let res = server
		.post_form("/profile/nobody/follow/", Some(token.as_str()), &[])
		.await;
	assert_eq!(res.status(), StatusCode::NOT_FOUND);

	server.shutdown().await;
}
