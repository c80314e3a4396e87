//! C-ABI wrapper around `konf-core`.
//!
//! # Overview
//! Exposes the conference API through `extern "C"` functions in two flavors:
//! - build/parse: the native host runs the HTTP round-trip itself
//!   (`konf_client_*`, `konf_build_*`, `konf_parse_*`);
//! - callback: the library runs the request on a background thread and
//!   reports back through a C function pointer (`konf_api_*`).
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiKonfResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly, for both flavors.
//! - The C caller owns all returned pointers and must call the matching
//!   `konf_free_*` function to release them. Callback results are owned by
//!   the callback.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use konf_core::{ApiError, HttpRequest, HttpResponse, KonfApi, KonfClient, Rating};

use types::*;

/// Read a borrowed C string. Null and invalid UTF-8 both yield `None`.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `KonfClient` bound to `base_url`, authenticating as `user_id`.
///
/// Returns null if either argument is null or if an internal panic occurs.
/// The caller must free the returned pointer with `konf_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn konf_client_new(base_url: *const c_char, user_id: *const c_char) -> *mut FfiKonfClient {
    catch_unwind(|| match (read_str(base_url), read_str(user_id)) {
        (Some(url), Some(user)) => Box::into_raw(Box::new(FfiKonfClient {
            inner: KonfClient::new(url, user),
        })),
        _ => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `KonfClient` created by `konf_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn konf_client_free(client: *mut FfiKonfClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Generate a fresh user id. Free with `konf_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn konf_new_user_id() -> *mut c_char {
    catch_unwind(|| c_string(konf_core::new_user_id())).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run `build` against the client behind `client`. Null client, a failed
/// build and a panic all produce null.
fn build_with<F>(client: *const FfiKonfClient, build: F) -> *mut FfiHttpRequest
where
    F: FnOnce(&KonfClient) -> Option<HttpRequest>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        build(&client.inner).map_or(std::ptr::null_mut(), FfiHttpRequest::from_core)
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Build the request that registers the client's user.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `konf_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn konf_build_create_user(client: *const FfiKonfClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_create_user()))
}

/// Build the request that fetches sessions, speakers, rooms and the user's
/// favorites and votes.
#[unsafe(no_mangle)]
pub extern "C" fn konf_build_get_all(client: *const FfiKonfClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(c.build_get_all()))
}

/// Returns null if `client` or `session_id` is null.
#[unsafe(no_mangle)]
pub extern "C" fn konf_build_post_favorite(
    client: *const FfiKonfClient,
    session_id: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let favorite = c.favorite(read_str(session_id)?);
        c.build_post_favorite(&favorite).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_build_delete_favorite(
    client: *const FfiKonfClient,
    session_id: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let favorite = c.favorite(read_str(session_id)?);
        c.build_delete_favorite(&favorite).ok()
    })
}

/// Build a vote request. `rating` must be -1, 0 or 1; anything else
/// returns null.
#[unsafe(no_mangle)]
pub extern "C" fn konf_build_post_vote(
    client: *const FfiKonfClient,
    session_id: *const c_char,
    rating: i32,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let vote = c.vote(read_str(session_id)?, Rating::from_value(rating)?);
        c.build_post_vote(&vote).ok()
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_build_delete_vote(
    client: *const FfiKonfClient,
    session_id: *const c_char,
    rating: i32,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let vote = c.vote(read_str(session_id)?, Rating::from_value(rating)?);
        c.build_delete_vote(&vote).ok()
    })
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// read as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: read_str(resp.body).unwrap_or("").to_string(),
    }
}

/// Shared body of every `konf_parse_*` function.
fn parse_with<T, F>(
    op: &str,
    client: *const FfiKonfClient,
    response: *const FfiHttpResponse,
    parse: F,
    ok: fn(T) -> *mut FfiKonfResult,
) -> *mut FfiKonfResult
where
    F: FnOnce(&KonfClient, HttpResponse) -> Result<T, ApiError>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiKonfResult::null_arg("client");
        }
        if response.is_null() {
            return FfiKonfResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        FfiKonfResult::from_result(parse(&client.inner, ffi_response_to_core(resp)), ok)
    }))
    .unwrap_or_else(|_| FfiKonfResult::panic(&format!("panic in konf_parse_{op}")))
}

/// Returns a result with `data_tag = Bool`: true when the user was created,
/// false when it already existed.
#[unsafe(no_mangle)]
pub extern "C" fn konf_parse_create_user(
    client: *const FfiKonfClient,
    response: *const FfiHttpResponse,
) -> *mut FfiKonfResult {
    parse_with("create_user", client, response, |c, r| c.parse_create_user(r), FfiKonfResult::ok_bool)
}

/// Returns a result with `data_tag = AllData` on success.
#[unsafe(no_mangle)]
pub extern "C" fn konf_parse_get_all(
    client: *const FfiKonfClient,
    response: *const FfiHttpResponse,
) -> *mut FfiKonfResult {
    parse_with("get_all", client, response, |c, r| c.parse_get_all(r), FfiKonfResult::ok_all_data)
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_parse_post_favorite(
    client: *const FfiKonfClient,
    response: *const FfiHttpResponse,
) -> *mut FfiKonfResult {
    parse_with("post_favorite", client, response, |c, r| c.parse_post_favorite(r), FfiKonfResult::ok_empty)
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_parse_delete_favorite(
    client: *const FfiKonfClient,
    response: *const FfiHttpResponse,
) -> *mut FfiKonfResult {
    parse_with("delete_favorite", client, response, |c, r| c.parse_delete_favorite(r), FfiKonfResult::ok_empty)
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_parse_post_vote(
    client: *const FfiKonfClient,
    response: *const FfiHttpResponse,
) -> *mut FfiKonfResult {
    parse_with("post_vote", client, response, |c, r| c.parse_post_vote(r), FfiKonfResult::ok_empty)
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_parse_delete_vote(
    client: *const FfiKonfClient,
    response: *const FfiHttpResponse,
) -> *mut FfiKonfResult {
    parse_with("delete_vote", client, response, |c, r| c.parse_delete_vote(r), FfiKonfResult::ok_empty)
}

// ---------------------------------------------------------------------------
// Callback API
// ---------------------------------------------------------------------------

/// Completion callback. Receives an owned result (free it with
/// `konf_free_result`) and the `user_data` passed at dispatch. Runs on a
/// background thread.
pub type KonfCallback = extern "C" fn(result: *mut FfiKonfResult, user_data: *mut c_void);

/// Callback plus the opaque pointer handed back to it.
struct CallbackTarget {
    callback: KonfCallback,
    user_data: *mut c_void,
}

// `user_data` is never dereferenced on the Rust side; the C caller vouches
// for using it from the callback thread.
unsafe impl Send for CallbackTarget {}

impl CallbackTarget {
    fn deliver<T>(self, op: &str, result: Result<T, ApiError>, ok: fn(T) -> *mut FfiKonfResult) {
        let ffi_result = catch_unwind(AssertUnwindSafe(|| FfiKonfResult::from_result(result, ok)))
            .unwrap_or_else(|_| FfiKonfResult::panic(&format!("panic in konf_api_{op}")));
        (self.callback)(ffi_result, self.user_data);
    }
}

/// Create an API handle that performs HTTP itself.
///
/// Returns null if either argument is null. Free with `konf_api_free`.
#[unsafe(no_mangle)]
pub extern "C" fn konf_api_new(base_url: *const c_char, user_id: *const c_char) -> *mut FfiKonfApi {
    catch_unwind(AssertUnwindSafe(|| match (read_str(base_url), read_str(user_id)) {
        (Some(url), Some(user)) => Box::into_raw(Box::new(FfiKonfApi {
            inner: KonfApi::new(url, user),
        })),
        _ => std::ptr::null_mut(),
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free an API handle. Requests already dispatched still complete and
/// invoke their callbacks. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn konf_api_free(api: *mut FfiKonfApi) {
    if !api.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(api) });
        }));
    }
}

/// Resolve the handle and callback, then let `dispatch` start the request.
/// Returns false (and never calls back) if `api` or `callback` is null, or
/// `dispatch` rejects its arguments.
fn dispatch_with<F>(api: *const FfiKonfApi, callback: Option<KonfCallback>, user_data: *mut c_void, dispatch: F) -> bool
where
    F: FnOnce(&KonfApi, CallbackTarget) -> bool,
{
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return false;
        };
        if api.is_null() {
            return false;
        }
        let api = unsafe { &*api };
        dispatch(&api.inner, CallbackTarget { callback, user_data })
    }))
    .unwrap_or(false)
}

/// Register the user in the background. The callback result has
/// `data_tag = Bool`.
#[unsafe(no_mangle)]
pub extern "C" fn konf_api_create_user(
    api: *const FfiKonfApi,
    callback: Option<KonfCallback>,
    user_data: *mut c_void,
) -> bool {
    dispatch_with(api, callback, user_data, |api, target| {
        api.create_user_with(move |r| target.deliver("create_user", r, FfiKonfResult::ok_bool));
        true
    })
}

/// Fetch everything in the background. The callback result has
/// `data_tag = AllData`.
#[unsafe(no_mangle)]
pub extern "C" fn konf_api_get_all(
    api: *const FfiKonfApi,
    callback: Option<KonfCallback>,
    user_data: *mut c_void,
) -> bool {
    dispatch_with(api, callback, user_data, |api, target| {
        api.get_all_with(move |r| target.deliver("get_all", r, FfiKonfResult::ok_all_data));
        true
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_api_post_favorite(
    api: *const FfiKonfApi,
    session_id: *const c_char,
    callback: Option<KonfCallback>,
    user_data: *mut c_void,
) -> bool {
    dispatch_with(api, callback, user_data, |api, target| {
        let Some(session_id) = read_str(session_id) else {
            return false;
        };
        let favorite = api.client().favorite(session_id);
        api.post_favorite_with(favorite, move |r| target.deliver("post_favorite", r, FfiKonfResult::ok_empty));
        true
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_api_delete_favorite(
    api: *const FfiKonfApi,
    session_id: *const c_char,
    callback: Option<KonfCallback>,
    user_data: *mut c_void,
) -> bool {
    dispatch_with(api, callback, user_data, |api, target| {
        let Some(session_id) = read_str(session_id) else {
            return false;
        };
        let favorite = api.client().favorite(session_id);
        api.delete_favorite_with(favorite, move |r| target.deliver("delete_favorite", r, FfiKonfResult::ok_empty));
        true
    })
}

/// Returns false for a rating outside -1..=1.
#[unsafe(no_mangle)]
pub extern "C" fn konf_api_post_vote(
    api: *const FfiKonfApi,
    session_id: *const c_char,
    rating: i32,
    callback: Option<KonfCallback>,
    user_data: *mut c_void,
) -> bool {
    dispatch_with(api, callback, user_data, |api, target| {
        let (Some(session_id), Some(rating)) = (read_str(session_id), Rating::from_value(rating)) else {
            return false;
        };
        let vote = api.client().vote(session_id, rating);
        api.post_vote_with(vote, move |r| target.deliver("post_vote", r, FfiKonfResult::ok_empty));
        true
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn konf_api_delete_vote(
    api: *const FfiKonfApi,
    session_id: *const c_char,
    rating: i32,
    callback: Option<KonfCallback>,
    user_data: *mut c_void,
) -> bool {
    dispatch_with(api, callback, user_data, |api, target| {
        let (Some(session_id), Some(rating)) = (read_str(session_id), Rating::from_value(rating)) else {
            return false;
        };
        let vote = api.client().vote(session_id, rating);
        api.delete_vote_with(vote, move |r| target.deliver("delete_vote", r, FfiKonfResult::ok_empty));
        true
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `konf_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn konf_free_request(req: *mut FfiHttpRequest) {
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free an `FfiKonfResult` from a `konf_parse_*` function or a callback.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn konf_free_result(result: *mut FfiKonfResult) {
    let _ = catch_unwind(|| unsafe { FfiKonfResult::free(result) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn konf_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| unsafe { free_c_string(s) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::sync::mpsc;
    use std::time::Duration;

    const BASE_URL: &str = "http://localhost:8080";

    fn new_client() -> *mut FfiKonfClient {
        let url = CString::new(BASE_URL).unwrap();
        let user = CString::new("user-1").unwrap();
        konf_client_new(url.as_ptr(), user.as_ptr())
    }

    fn str_at<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn header_at(req: &FfiHttpRequest, i: usize) -> (&str, &str) {
        let headers = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        (str_at(headers[i].key), str_at(headers[i].value))
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        konf_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let url = CString::new(BASE_URL).unwrap();
        assert!(konf_client_new(std::ptr::null(), std::ptr::null()).is_null());
        assert!(konf_client_new(url.as_ptr(), std::ptr::null()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        konf_client_free(std::ptr::null_mut());
    }

    #[test]
    fn new_user_id_is_a_uuid() {
        let id = konf_new_user_id();
        assert!(!id.is_null());
        assert_eq!(str_at(id).len(), 36);
        konf_free_string(id);
    }

    #[test]
    fn build_create_user_posts_user_id() {
        let client = new_client();
        let req = konf_build_create_user(client);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Post);
        assert_eq!(str_at(req_ref.path), "http://localhost:8080/users");
        assert_eq!(str_at(req_ref.body), "user-1");
        assert_eq!(req_ref.headers_len, 1);
        assert_eq!(header_at(req_ref, 0), ("content-type", "text/plain"));

        konf_free_request(req);
        konf_client_free(client);
    }

    #[test]
    fn build_get_all_has_bearer_and_no_body() {
        let client = new_client();
        let req = konf_build_get_all(client);
        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Get);
        assert_eq!(str_at(req_ref.path), "http://localhost:8080/all");
        assert!(req_ref.body.is_null());
        assert_eq!(header_at(req_ref, 0), ("authorization", "Bearer user-1"));

        konf_free_request(req);
        konf_client_free(client);
    }

    #[test]
    fn build_null_client_returns_null() {
        assert!(konf_build_get_all(std::ptr::null()).is_null());
        assert!(konf_build_create_user(std::ptr::null()).is_null());
    }

    #[test]
    fn build_delete_favorite_carries_json_body() {
        let client = new_client();
        let session = CString::new("s42").unwrap();
        let req = konf_build_delete_favorite(client, session.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(req_ref.method, FfiHttpMethod::Delete);
        assert_eq!(str_at(req_ref.path), "http://localhost:8080/favorites");
        assert_eq!(req_ref.headers_len, 2);
        let body: serde_json::Value = serde_json::from_str(str_at(req_ref.body)).unwrap();
        assert_eq!(body["userId"], "user-1");
        assert_eq!(body["sessionId"], "s42");

        konf_free_request(req);
        konf_client_free(client);
    }

    #[test]
    fn build_favorite_null_session_returns_null() {
        let client = new_client();
        assert!(konf_build_post_favorite(client, std::ptr::null()).is_null());
        konf_client_free(client);
    }

    #[test]
    fn build_post_vote_validates_rating() {
        let client = new_client();
        let session = CString::new("s1").unwrap();

        let req = konf_build_post_vote(client, session.as_ptr(), -1);
        assert!(!req.is_null());
        let body: serde_json::Value = serde_json::from_str(str_at(unsafe { &*req }.body)).unwrap();
        assert_eq!(body["rating"], -1);
        konf_free_request(req);

        assert!(konf_build_post_vote(client, session.as_ptr(), 3).is_null());
        assert!(konf_build_delete_vote(client, session.as_ptr(), -7).is_null());
        konf_client_free(client);
    }

    #[test]
    fn parse_create_user_returns_bool() {
        let client = new_client();
        for (status, expected) in [(201u16, true), (409, false)] {
            let resp = FfiHttpResponse {
                status,
                body: std::ptr::null(),
            };
            let result = konf_parse_create_user(client, &resp);
            let r = unsafe { &*result };
            assert_eq!(r.error_code, FfiErrorCode::Ok);
            assert_eq!(r.data_tag, FfiDataTag::Bool);
            assert_eq!(unsafe { *(r.data as *const bool) }, expected);
            konf_free_result(result);
        }
        konf_client_free(client);
    }

    #[test]
    fn parse_get_all_flattens_payload() {
        let client = new_client();
        let body = CString::new(
            r#"{
                "sessions":[
                    {"id":"s1","title":"Keynote","startsAt":"2018-10-04T09:00:00","endsAt":"2018-10-04T10:00:00","roomId":1,"speakers":["sp1"]},
                    {"id":"s2","title":"Lunch","startsAt":"2018-10-04T12:00:00","endsAt":"2018-10-04T13:00:00","isServiceSession":true}
                ],
                "speakers":[{"id":"sp1","firstName":"Ada","lastName":"Lovelace","fullName":"Ada Lovelace"}],
                "rooms":[{"id":1,"name":"Main Hall"}],
                "favorites":[{"userId":"user-1","sessionId":"s1"}],
                "votes":[{"userId":"user-1","sessionId":"s1","rating":0}]
            }"#,
        )
        .unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = konf_parse_get_all(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::AllData);

        let data = unsafe { &*(r.data as *const FfiAllData) };
        assert_eq!(data.sessions_len, 2);
        let sessions = unsafe { std::slice::from_raw_parts(data.sessions, 2) };
        assert_eq!(str_at(sessions[0].title), "Keynote");
        assert_eq!(str_at(sessions[0].starts_at), "2018-10-04T09:00:00");
        assert!(sessions[0].has_room_id);
        assert_eq!(sessions[0].room_id, 1);
        assert_eq!(sessions[0].speaker_ids_len, 1);
        assert!(sessions[0].description.is_null());
        assert!(!sessions[1].has_room_id);
        assert!(sessions[1].is_service_session);
        assert!(sessions[1].speaker_ids.is_null());

        let speakers = unsafe { std::slice::from_raw_parts(data.speakers, data.speakers_len as usize) };
        assert_eq!(str_at(speakers[0].full_name), "Ada Lovelace");
        let rooms = unsafe { std::slice::from_raw_parts(data.rooms, data.rooms_len as usize) };
        assert!(!rooms[0].has_sort);
        assert_eq!(data.favorites_len, 1);
        let votes = unsafe { std::slice::from_raw_parts(data.votes, data.votes_len as usize) };
        assert_eq!(votes[0].rating, 0);

        konf_free_result(result);
        konf_client_free(client);
    }

    #[test]
    fn parse_get_all_unauthorized() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 401,
            body: std::ptr::null(),
        };
        let result = konf_parse_get_all(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Unauthorized);
        assert_eq!(r.http_status, 401);
        assert!(!r.error_message.is_null());
        assert!(r.data.is_null());

        konf_free_result(result);
        konf_client_free(client);
    }

    #[test]
    fn parse_delete_vote_not_found() {
        let client = new_client();
        let body = CString::new("").unwrap();
        let resp = FfiHttpResponse {
            status: 404,
            body: body.as_ptr(),
        };
        let result = konf_parse_delete_vote(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NotFound);
        assert_eq!(r.http_status, 404);

        konf_free_result(result);
        konf_client_free(client);
    }

    #[test]
    fn parse_post_favorite_success_has_no_data() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 201,
            body: std::ptr::null(),
        };
        let result = konf_parse_post_favorite(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::None);
        assert!(r.data.is_null());

        konf_free_result(result);
        konf_client_free(client);
    }

    #[test]
    fn parse_null_arguments_return_null_arg() {
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
        };
        let result = konf_parse_get_all(std::ptr::null(), &resp);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        konf_free_result(result);

        let client = new_client();
        let result = konf_parse_post_vote(client, std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        konf_free_result(result);
        konf_client_free(client);
    }

    #[test]
    fn free_functions_accept_null() {
        konf_free_request(std::ptr::null_mut());
        konf_free_result(std::ptr::null_mut());
        konf_free_string(std::ptr::null_mut());
        konf_api_free(std::ptr::null_mut());
    }

    // --- callback API ---

    /// Forwards each callback result to the `mpsc::Sender` behind `user_data`.
    extern "C" fn forward(result: *mut FfiKonfResult, user_data: *mut c_void) {
        let tx = unsafe { &*(user_data as *const mpsc::Sender<usize>) };
        tx.send(result as usize).unwrap();
    }

    /// Start the mock server on an ephemeral port and return its base URL.
    fn start_server() -> String {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        format!("http://{addr}")
    }

    fn wait(rx: &mpsc::Receiver<usize>) -> *mut FfiKonfResult {
        rx.recv_timeout(Duration::from_secs(10)).unwrap() as *mut FfiKonfResult
    }

    #[test]
    fn api_dispatch_rejects_null_arguments() {
        let url = CString::new(BASE_URL).unwrap();
        let user = CString::new("user-1").unwrap();
        let api = konf_api_new(url.as_ptr(), user.as_ptr());
        assert!(!konf_api_get_all(api, None, std::ptr::null_mut()));
        assert!(!konf_api_get_all(std::ptr::null(), Some(forward), std::ptr::null_mut()));
        assert!(!konf_api_post_favorite(api, std::ptr::null(), Some(forward), std::ptr::null_mut()));
        konf_api_free(api);
    }

    #[test]
    fn api_callbacks_against_mock_server() {
        let url = CString::new(start_server()).unwrap();
        let user = CString::new("ffi-user").unwrap();
        let api = konf_api_new(url.as_ptr(), user.as_ptr());
        assert!(!api.is_null());

        let (tx, rx) = mpsc::channel::<usize>();
        let user_data = &tx as *const mpsc::Sender<usize> as *mut c_void;

        assert!(konf_api_create_user(api, Some(forward), user_data));
        let result = wait(&rx);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(unsafe { *(r.data as *const bool) });
        konf_free_result(result);

        let session = CString::new("opening").unwrap();
        assert!(konf_api_post_favorite(api, session.as_ptr(), Some(forward), user_data));
        let result = wait(&rx);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::Ok);
        konf_free_result(result);

        assert!(konf_api_get_all(api, Some(forward), user_data));
        let result = wait(&rx);
        let r = unsafe { &*result };
        assert_eq!(r.data_tag, FfiDataTag::AllData);
        let data = unsafe { &*(r.data as *const FfiAllData) };
        assert_eq!(data.sessions_len, 4);
        assert_eq!(data.favorites_len, 1);
        konf_free_result(result);

        assert!(konf_api_delete_vote(api, session.as_ptr(), 1, Some(forward), user_data));
        let result = wait(&rx);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NotFound);
        konf_free_result(result);

        konf_api_free(api);
    }
}
