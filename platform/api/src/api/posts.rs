use common::http::ext::{OptionExt, ResultExt};
use common::http::redirect;
use common::make_response;
use hyper::{Body, Method, Request, Response, StatusCode};
use serde_json::json;

use super::error::Result;
use super::ext::RequestExt;
use super::form::{CommentForm, FormErrors, PostForm, RawForm, Upload};
use super::views::{self, CommentView, PostView};
use super::{full_path, post_path, profile_path};
use crate::database::{Comment, Group, Post};
use crate::global::GlobalState;

const NOT_FOUND: (StatusCode, &str) = (StatusCode::NOT_FOUND, "not_found");

pub async fn post_detail(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;

	let post_id = req.param_id("id").map_err_route(NOT_FOUND)?;
	let post = Post::by_id(&global.db, post_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query post"))?
		.map_err_route(NOT_FOUND)?;

	let posts_count = Post::count_by_author(&global.db, post.author_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to count posts"))?;

	let comments: Vec<CommentView> = Comment::for_post(&global.db, post.id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query comments"))?
		.into_iter()
		.map(CommentView::from)
		.collect();

	Ok(make_response!(
		StatusCode::OK,
		json!({
			"post": PostView::from(post),
			"posts_count": posts_count,
			"comments": comments,
			"form": views::comment_form(&FormErrors::new()),
		})
	))
}

fn form_response(
	status: StatusCode,
	groups: &[Group],
	form: &PostForm,
	current_image: Option<&str>,
	errors: &FormErrors,
	post_id: Option<i64>,
) -> Response<Body> {
	make_response!(
		status,
		json!({
			"form": views::post_form(groups, form, current_image, errors),
			"is_edit": post_id.is_some(),
			"post_id": post_id,
		})
	)
}

async fn store_image(global: &GlobalState, upload: Option<&Upload>) -> Result<Option<String>> {
	let Some(upload) = upload else {
		return Ok(None);
	};

	let path = global
		.media
		.save_post_image(upload.file_name.as_deref(), &upload.data)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to store image"))?;

	Ok(Some(path))
}

async fn load_groups(global: &GlobalState) -> Result<Vec<Group>> {
	Group::all(&global.db)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query groups"))
}

/// `GET` describes the empty form, `POST` creates the post and redirects to
/// the author's profile.
#[tracing::instrument(skip_all, fields(method = %req.method()))]
pub async fn post_create(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;
	let auth = req.request_context().require_auth(&full_path(&req))?.clone();

	let groups = load_groups(&global).await?;

	if req.method() == Method::GET {
		return Ok(form_response(
			StatusCode::OK,
			&groups,
			&PostForm::default(),
			None,
			&FormErrors::new(),
			None,
		));
	}

	let raw = RawForm::from_request(req, PostForm::FILE_FIELDS, global.config.media.max_image_size).await?;
	let form = match PostForm::from_raw(raw)
		.validate(&global.db)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query group"))?
	{
		Ok(form) => form,
		Err((form, errors)) => {
			return Ok(form_response(StatusCode::BAD_REQUEST, &groups, &form, None, &errors, None));
		}
	};

	let image = store_image(&global, form.image.as_ref()).await?;
	let post = Post::create(&global.db, auth.user_id(), &form.into_post_data(image))
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create post"))?;

	tracing::info!(post_id = post.id, author = %auth.user.username, "post created");

	Ok(redirect(&profile_path(&auth.user.username)))
}

/// Only the author may edit a post, anyone else is sent back to the post.
#[tracing::instrument(skip_all, fields(method = %req.method(), post_id = req.param_id("id")))]
pub async fn post_edit(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;
	let auth = req.request_context().require_auth(&full_path(&req))?.clone();

	let post_id = req.param_id("id").map_err_route(NOT_FOUND)?;
	let post = Post::by_id(&global.db, post_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query post"))?
		.map_err_route(NOT_FOUND)?;

	if post.author_id != auth.user_id() {
		tracing::debug!(user_id = auth.user_id(), author_id = post.author_id, "edit by non-author");
		return Ok(redirect(&post_path(post.id)));
	}

	let groups = load_groups(&global).await?;

	if req.method() == Method::GET {
		let current = PostForm {
			text: post.text.clone(),
			group: post.group_id.map(|id| id.to_string()),
			image: None,
		};

		return Ok(form_response(
			StatusCode::OK,
			&groups,
			&current,
			post.image.as_deref(),
			&FormErrors::new(),
			Some(post.id),
		));
	}

	let raw = RawForm::from_request(req, PostForm::FILE_FIELDS, global.config.media.max_image_size).await?;
	let form = match PostForm::from_raw(raw)
		.validate(&global.db)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query group"))?
	{
		Ok(form) => form,
		Err((form, errors)) => {
			return Ok(form_response(
				StatusCode::BAD_REQUEST,
				&groups,
				&form,
				post.image.as_deref(),
				&errors,
				Some(post.id),
			));
		}
	};

	let image = store_image(&global, form.image.as_ref()).await?;
	Post::update(&global.db, post.id, &form.into_post_data(image))
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to update post"))?
		.map_err_route(NOT_FOUND)?;

	tracing::info!(post_id = post.id, "post updated");

	Ok(redirect(&post_path(post.id)))
}

/// Adds a comment and returns to the post. An invalid form creates nothing.
pub async fn add_comment(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global()?;
	let auth = req.request_context().require_auth(&full_path(&req))?.clone();

	let post_id = req.param_id("id").map_err_route(NOT_FOUND)?;
	let post = Post::by_id(&global.db, post_id)
		.await
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to query post"))?
		.map_err_route(NOT_FOUND)?;

	let form = CommentForm::from_raw(RawForm::from_request(req, &[], 0).await?);
	match form.validate() {
		Ok(text) => {
			let comment = Comment::create(&global.db, post.id, auth.user_id(), text)
				.await
				.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to create comment"))?;
			tracing::debug!(post_id = post.id, comment_id = comment.id, "comment created");
		}
		Err(errors) => tracing::debug!(post_id = post.id, ?errors, "invalid comment form"),
	}

	Ok(redirect(&post_path(post.id)))
}
