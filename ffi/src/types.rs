//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, a
//! `has_*` flag next to values that are optional in the core, and tagged
//! enums with explicit discriminants. Conversion and free helpers live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use konf_core::{AllData, ApiError, Favorite, HttpMethod, Room, Session, Speaker, Vote};

/// Opaque handle to a `KonfClient`. C callers receive a pointer to this
/// and pass it back into every `konf_build_*` / `konf_parse_*` function.
pub struct FfiKonfClient {
    pub(crate) inner: konf_core::KonfClient,
}

/// Opaque handle to a `KonfApi` that performs its own HTTP.
pub struct FfiKonfApi {
    pub(crate) inner: konf_core::KonfApi,
}

// ---------------------------------------------------------------------------
// Allocation helpers
// ---------------------------------------------------------------------------

/// Strings with an interior NUL cannot be represented; they become empty.
pub(crate) fn c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) fn opt_c_string(s: Option<String>) -> *mut c_char {
    s.map_or(std::ptr::null_mut(), c_string)
}

/// Hand a vector to C as pointer + length. Empty vectors become null.
pub(crate) fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let len = items.len() as u32;
    let ptr = Box::into_raw(items.into_boxed_slice()) as *mut T;
    (ptr, len)
}

/// Reclaim a vector produced by `into_raw_parts`.
///
/// # Safety
/// `ptr`/`len` must come from `into_raw_parts` and not be reclaimed twice.
pub(crate) unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize)) }.into_vec()
}

/// # Safety
/// `s` must be null or come from `c_string`.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `konf_build_*` functions. The C caller executes the request
/// and passes the response back through `konf_parse_*`. `body` may be set
/// on `Delete` requests too.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: konf_core::HttpRequest) -> *mut Self {
        let (headers, headers_len) = into_raw_parts(
            req.headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect(),
        );
        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body: opt_c_string(req.body),
        }))
    }

    /// # Safety
    /// `req` must be null or come from `from_core`.
    pub(crate) unsafe fn free(req: *mut Self) {
        if req.is_null() {
            return;
        }
        let req = unsafe { Box::from_raw(req) };
        unsafe {
            free_c_string(req.path);
            free_c_string(req.body);
            for h in from_raw_parts(req.headers, req.headers_len) {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `konf_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A session exposed to C. Times are `YYYY-MM-DDTHH:MM:SS` strings.
#[repr(C)]
pub struct FfiSession {
    pub id: *mut c_char,
    pub title: *mut c_char,
    /// Null when the session has no description.
    pub description: *mut c_char,
    pub starts_at: *mut c_char,
    pub ends_at: *mut c_char,
    pub has_room_id: bool,
    pub room_id: i64,
    pub speaker_ids: *mut *mut c_char,
    pub speaker_ids_len: u32,
    pub is_service_session: bool,
    pub is_plenum_session: bool,
}

#[repr(C)]
pub struct FfiSpeaker {
    pub id: *mut c_char,
    pub first_name: *mut c_char,
    pub last_name: *mut c_char,
    pub full_name: *mut c_char,
    pub bio: *mut c_char,
    pub tag_line: *mut c_char,
    pub profile_picture: *mut c_char,
    pub is_top_speaker: bool,
}

#[repr(C)]
pub struct FfiRoom {
    pub id: i64,
    pub name: *mut c_char,
    pub has_sort: bool,
    pub sort: i32,
}

#[repr(C)]
pub struct FfiFavorite {
    pub user_id: *mut c_char,
    pub session_id: *mut c_char,
}

#[repr(C)]
pub struct FfiVote {
    pub user_id: *mut c_char,
    pub session_id: *mut c_char,
    pub rating: i32,
}

/// The `get_all` payload exposed to C.
#[repr(C)]
pub struct FfiAllData {
    pub sessions: *mut FfiSession,
    pub sessions_len: u32,
    pub speakers: *mut FfiSpeaker,
    pub speakers_len: u32,
    pub rooms: *mut FfiRoom,
    pub rooms_len: u32,
    pub favorites: *mut FfiFavorite,
    pub favorites_len: u32,
    pub votes: *mut FfiVote,
    pub votes_len: u32,
}

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl From<Session> for FfiSession {
    fn from(s: Session) -> Self {
        let (speaker_ids, speaker_ids_len) = into_raw_parts(s.speakers.into_iter().map(c_string).collect());
        FfiSession {
            id: c_string(s.id),
            title: c_string(s.title),
            description: opt_c_string(s.description),
            starts_at: c_string(s.starts_at.format(DATE_TIME_FORMAT).to_string()),
            ends_at: c_string(s.ends_at.format(DATE_TIME_FORMAT).to_string()),
            has_room_id: s.room_id.is_some(),
            room_id: s.room_id.unwrap_or_default(),
            speaker_ids,
            speaker_ids_len,
            is_service_session: s.is_service_session,
            is_plenum_session: s.is_plenum_session,
        }
    }
}

impl From<Speaker> for FfiSpeaker {
    fn from(s: Speaker) -> Self {
        FfiSpeaker {
            id: c_string(s.id),
            first_name: c_string(s.first_name),
            last_name: c_string(s.last_name),
            full_name: c_string(s.full_name),
            bio: opt_c_string(s.bio),
            tag_line: opt_c_string(s.tag_line),
            profile_picture: opt_c_string(s.profile_picture),
            is_top_speaker: s.is_top_speaker,
        }
    }
}

impl From<Room> for FfiRoom {
    fn from(r: Room) -> Self {
        FfiRoom {
            id: r.id,
            name: c_string(r.name),
            has_sort: r.sort.is_some(),
            sort: r.sort.unwrap_or_default(),
        }
    }
}

impl From<Favorite> for FfiFavorite {
    fn from(f: Favorite) -> Self {
        FfiFavorite {
            user_id: c_string(f.user_id),
            session_id: c_string(f.session_id),
        }
    }
}

impl From<Vote> for FfiVote {
    fn from(v: Vote) -> Self {
        FfiVote {
            user_id: c_string(v.user_id),
            session_id: c_string(v.session_id),
            rating: v.rating,
        }
    }
}

fn convert_all<T, U: From<T>>(items: Vec<T>) -> (*mut U, u32) {
    into_raw_parts(items.into_iter().map(U::from).collect())
}

impl From<AllData> for FfiAllData {
    fn from(data: AllData) -> Self {
        let (sessions, sessions_len) = convert_all(data.sessions);
        let (speakers, speakers_len) = convert_all(data.speakers);
        let (rooms, rooms_len) = convert_all(data.rooms);
        let (favorites, favorites_len) = convert_all(data.favorites);
        let (votes, votes_len) = convert_all(data.votes);
        FfiAllData {
            sessions,
            sessions_len,
            speakers,
            speakers_len,
            rooms,
            rooms_len,
            favorites,
            favorites_len,
            votes,
            votes_len,
        }
    }
}

impl FfiAllData {
    /// Free every string and array reachable from `data`, then `data` itself.
    ///
    /// # Safety
    /// `data` must come from `Box::into_raw` of a value built by `From<AllData>`.
    pub(crate) unsafe fn free(data: *mut Self) {
        let data = unsafe { Box::from_raw(data) };
        unsafe {
            for s in from_raw_parts(data.sessions, data.sessions_len) {
                for field in [s.id, s.title, s.description, s.starts_at, s.ends_at] {
                    free_c_string(field);
                }
                for speaker_id in from_raw_parts(s.speaker_ids, s.speaker_ids_len) {
                    free_c_string(speaker_id);
                }
            }
            for s in from_raw_parts(data.speakers, data.speakers_len) {
                for field in [
                    s.id,
                    s.first_name,
                    s.last_name,
                    s.full_name,
                    s.bio,
                    s.tag_line,
                    s.profile_picture,
                ] {
                    free_c_string(field);
                }
            }
            for r in from_raw_parts(data.rooms, data.rooms_len) {
                free_c_string(r.name);
            }
            for f in from_raw_parts(data.favorites, data.favorites_len) {
                free_c_string(f.user_id);
                free_c_string(f.session_id);
            }
            for v in from_raw_parts(data.votes, data.votes_len) {
                free_c_string(v.user_id);
                free_c_string(v.session_id);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiKonfResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Unauthorized = 2,
    Http = 3,
    Deserialization = 4,
    Serialization = 5,
    Transport = 6,
    Panic = 7,
    NullArg = 8,
}

/// Tag that tells `konf_free_result` what `FfiKonfResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` points to a `bool`.
    Bool = 1,
    /// `data` points to an `FfiAllData`.
    AllData = 2,
}

/// Result envelope for all parse and callback operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiKonfResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiKonfResult {
    fn ok(data_tag: FfiDataTag, data: *mut c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiKonfResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiKonfResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_bool(value: bool) -> *mut Self {
        Self::ok(FfiDataTag::Bool, Box::into_raw(Box::new(value)) as *mut c_void)
    }

    pub(crate) fn ok_all_data(data: AllData) -> *mut Self {
        let ffi_data = Box::new(FfiAllData::from(data));
        Self::ok(FfiDataTag::AllData, Box::into_raw(ffi_data) as *mut c_void)
    }

    /// Build a success result with no data payload (favorites and votes).
    pub(crate) fn ok_empty(_: ()) -> *mut Self {
        Self::ok(FfiDataTag::None, std::ptr::null_mut())
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::Unauthorized { .. } => FfiErrorCode::Unauthorized,
            ApiError::HttpError { .. } => FfiErrorCode::Http,
            ApiError::DeserializationError(_) => FfiErrorCode::Deserialization,
            ApiError::SerializationError(_) => FfiErrorCode::Serialization,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        };
        Self::error(code, err.status().unwrap_or(0), err.to_string())
    }

    pub(crate) fn from_result<T>(result: Result<T, ApiError>, ok: fn(T) -> *mut Self) -> *mut Self {
        match result {
            Ok(value) => ok(value),
            Err(err) => Self::from_error(err),
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }

    /// # Safety
    /// `result` must be null or come from one of the constructors above.
    pub(crate) unsafe fn free(result: *mut Self) {
        if result.is_null() {
            return;
        }
        let result = unsafe { Box::from_raw(result) };
        unsafe { free_c_string(result.error_message) };
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Bool => drop(unsafe { Box::from_raw(result.data as *mut bool) }),
            FfiDataTag::AllData => unsafe { FfiAllData::free(result.data as *mut FfiAllData) },
            FfiDataTag::None => {}
        }
    }
}
