use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::form::{FormErrors, PostForm};
use crate::database::{Comment, Group, Post, User};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
	pub id: i64,
	pub username: String,
}

impl From<&User> for UserView {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			username: user.username.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRef {
	pub slug: String,
	pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
	pub id: i64,
	pub text: String,
	pub pub_date: DateTime<Utc>,
	pub author: UserView,
	pub group: Option<GroupRef>,
	/// URL of the image, if the post has one.
	pub image: Option<String>,
}

impl From<Post> for PostView {
	fn from(post: Post) -> Self {
		let group = match (post.group_slug, post.group_title) {
			(Some(slug), Some(title)) => Some(GroupRef { slug, title }),
			_ => None,
		};

		Self {
			id: post.id,
			text: post.text,
			pub_date: post.pub_date,
			author: UserView {
				id: post.author_id,
				username: post.author_username,
			},
			group,
			image: post.image.map(|image| format!("/media/{image}")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
	pub id: i64,
	pub text: String,
	pub created: DateTime<Utc>,
	pub author: UserView,
}

impl From<Comment> for CommentView {
	fn from(comment: Comment) -> Self {
		Self {
			id: comment.id,
			text: comment.text,
			created: comment.created,
			author: UserView {
				id: comment.author_id,
				username: comment.author_username,
			},
		}
	}
}

/// Describes the post form: its fields, their current values, the group
/// choices and any validation errors.
pub fn post_form(groups: &[Group], form: &PostForm, current_image: Option<&str>, errors: &FormErrors) -> Value {
	let choices: Vec<Value> = groups
		.iter()
		.map(|group| json!({ "id": group.id, "title": group.to_string() }))
		.collect();

	json!({
		"fields": {
			"text": { "required": true, "value": form.text },
			"group": { "required": false, "value": form.group, "choices": choices },
			"image": { "required": false, "value": current_image.map(|image| format!("/media/{image}")) },
		},
		"errors": errors,
	})
}

/// The comment form shown under a post.
pub fn comment_form(errors: &FormErrors) -> Value {
	json!({
		"fields": {
			"text": { "required": true, "value": "" },
		},
		"errors": errors,
	})
}
