//! [`FakeSiteApi`]: a stateful in-memory stand-in for the remote.
//!
//! Behaves like the real service closely enough for engine tests: sites are
//! looked up by owner and name, publish requests only hand out upload
//! directives for files whose hash differs from what is stored, and stored
//! state changes only when bytes are uploaded or files are deleted.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use vault_client::{
    CallKind, DeleteResponse, Error, FileRecord, Result, Site, SiteApi, SyncResponse,
    SyncSummary, UploadDirective, UserInfo,
};
use vault_fs::fingerprint;

/// Which API operation a call or injected failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GetUserInfo,
    GetSiteByName,
    CreateSite,
    SyncFiles,
    PublishFiles,
    DeleteFiles,
    UploadToStorage,
}

/// One recorded call, with the arguments tests usually assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetUserInfo,
    GetSiteByName { owner: String, name: String },
    CreateSite { name: String },
    SyncFiles { site_id: String, paths: Vec<String>, dry_run: bool },
    PublishFiles { site_id: String, paths: Vec<String> },
    DeleteFiles { site_id: String, paths: Vec<String> },
    UploadToStorage { path: String, size: usize, content_type: String },
}

impl ApiCall {
    pub fn method(&self) -> Method {
        match self {
            ApiCall::GetUserInfo => Method::GetUserInfo,
            ApiCall::GetSiteByName { .. } => Method::GetSiteByName,
            ApiCall::CreateSite { .. } => Method::CreateSite,
            ApiCall::SyncFiles { .. } => Method::SyncFiles,
            ApiCall::PublishFiles { .. } => Method::PublishFiles,
            ApiCall::DeleteFiles { .. } => Method::DeleteFiles,
            ApiCall::UploadToStorage { .. } => Method::UploadToStorage,
        }
    }
}

struct PendingUpload {
    site_id: String,
    record: FileRecord,
}

#[derive(Default)]
struct State {
    username: String,
    sites: Vec<Site>,
    /// Stored records per site id
    stored: HashMap<String, BTreeMap<String, FileRecord>>,
    pending: HashMap<String, PendingUpload>,
    uploads: Vec<(String, Vec<u8>)>,
    calls: Vec<ApiCall>,
    fail_next: HashMap<Method, VecDeque<Error>>,
    fail_always: HashMap<Method, Error>,
    fail_uploads: HashMap<String, Error>,
}

/// In-memory [`SiteApi`] with a call log and failure injection.
///
/// # Example
///
/// ```rust
/// use vault_test_utils::{FakeSiteApi, Method};
///
/// let api = FakeSiteApi::new("alice").with_site("garden");
/// assert!(api.site("garden").is_some());
/// assert_eq!(api.calls_to(Method::CreateSite), 0);
/// ```
pub struct FakeSiteApi {
    state: Mutex<State>,
    create_delay: Duration,
}

const STORAGE_BASE: &str = "https://storage.test/upload";

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "md" => "text/markdown",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

impl FakeSiteApi {
    /// A remote where the token belongs to `username` and no site exists.
    pub fn new(username: &str) -> Self {
        Self {
            state: Mutex::new(State {
                username: username.to_string(),
                ..State::default()
            }),
            create_delay: Duration::ZERO,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("FakeSiteApi: poisoned lock")
    }

    fn add_site(state: &mut State, name: &str) -> Site {
        let site = Site {
            id: format!("site-{}", state.sites.len() + 1),
            name: name.to_string(),
            url: format!("https://sites.test/@{}/{}", state.username, name),
            owner: state.username.clone(),
        };
        state.sites.push(site.clone());
        state.stored.insert(site.id.clone(), BTreeMap::new());
        site
    }

    /// Pre-create a site owned by the token owner.
    pub fn with_site(self, name: &str) -> Self {
        Self::add_site(&mut self.state(), name);
        self
    }

    /// Store a file on an existing site as if it had been published before.
    ///
    /// # Panics
    ///
    /// Panics if the site does not exist.
    pub fn with_remote_file(self, site_name: &str, path: &str, content: &[u8]) -> Self {
        {
            let mut state = self.state();
            let site_id = state
                .sites
                .iter()
                .find(|s| s.name == site_name)
                .map(|s| s.id.clone())
                .unwrap_or_else(|| panic!("FakeSiteApi: no site named {}", site_name));
            let record = FileRecord {
                path: path.to_string(),
                size: content.len() as u64,
                sha: fingerprint(content),
            };
            state
                .stored
                .entry(site_id)
                .or_default()
                .insert(path.to_string(), record);
        }
        self
    }

    /// Delay site creation so concurrent resolutions overlap.
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// Fail the next call to `method` with `error`. Failures queue up.
    pub fn fail_next(&self, method: Method, error: Error) {
        self.state()
            .fail_next
            .entry(method)
            .or_default()
            .push_back(error);
    }

    /// Fail every call to `method` with `error`.
    pub fn fail_always(&self, method: Method, error: Error) {
        self.state().fail_always.insert(method, error);
    }

    /// Fail every upload of `path` with `error`.
    pub fn fail_upload(&self, path: &str, error: Error) {
        self.state().fail_uploads.insert(path.to_string(), error);
    }

    /// A storage failure suitable for injection.
    pub fn storage_error(status: u16) -> Error {
        Error::from_status(CallKind::Storage, status, "storage rejected the upload")
    }

    /// A connection failure suitable for injection.
    pub fn network_error() -> Error {
        Error::transport("connection refused")
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state().calls.clone()
    }

    pub fn calls_to(&self, method: Method) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.method() == method)
            .count()
    }

    pub fn site(&self, name: &str) -> Option<Site> {
        self.state().sites.iter().find(|s| s.name == name).cloned()
    }

    /// Paths stored on a site, sorted.
    pub fn stored_paths(&self, site_name: &str) -> Vec<String> {
        let state = self.state();
        state
            .sites
            .iter()
            .find(|s| s.name == site_name)
            .and_then(|site| state.stored.get(&site.id))
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Bytes received by storage, in arrival order.
    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.state().uploads.clone()
    }

    /// Paths received by storage, sorted.
    pub fn uploaded_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .state()
            .uploads
            .iter()
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    /// Log the call and apply any injected failure.
    fn begin(&self, call: ApiCall) -> Result<()> {
        let mut state = self.state();
        let method = call.method();
        state.calls.push(call);
        if let Some(error) = state
            .fail_next
            .get_mut(&method)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        if let Some(error) = state.fail_always.get(&method) {
            return Err(error.clone());
        }
        Ok(())
    }

    fn stored_for<'a>(state: &'a State, site_id: &str) -> Result<&'a BTreeMap<String, FileRecord>> {
        state
            .stored
            .get(site_id)
            .ok_or_else(|| Error::from_status(CallKind::Api, 404, r#"{"error":"Site not found"}"#))
    }
}

#[async_trait]
impl SiteApi for FakeSiteApi {
    async fn get_user_info(&self) -> Result<UserInfo> {
        self.begin(ApiCall::GetUserInfo)?;
        Ok(UserInfo {
            username: self.state().username.clone(),
            email: None,
            id: None,
        })
    }

    async fn get_site_by_name(&self, owner: &str, name: &str) -> Result<Option<Site>> {
        self.begin(ApiCall::GetSiteByName {
            owner: owner.to_string(),
            name: name.to_string(),
        })?;
        Ok(self
            .state()
            .sites
            .iter()
            .find(|s| s.owner == owner && s.name == name)
            .cloned())
    }

    async fn create_site(&self, name: &str) -> Result<Site> {
        self.begin(ApiCall::CreateSite {
            name: name.to_string(),
        })?;
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }

        let mut state = self.state();
        if let Some(existing) = state.sites.iter().find(|s| s.name == name) {
            return Ok(existing.clone());
        }
        Ok(Self::add_site(&mut state, name))
    }

    async fn sync_files(
        &self,
        site_id: &str,
        files: &[FileRecord],
        dry_run: bool,
    ) -> Result<SyncResponse> {
        self.begin(ApiCall::SyncFiles {
            site_id: site_id.to_string(),
            paths: files.iter().map(|f| f.path.clone()).collect(),
            dry_run,
        })?;

        let state = self.state();
        let stored = Self::stored_for(&state, site_id)?;

        let mut response = SyncResponse::default();
        for file in files {
            match stored.get(&file.path) {
                Some(existing) if existing.sha == file.sha => {
                    response.unchanged.push(file.path.clone())
                }
                Some(_) => response.to_update.push(file.path.clone()),
                None => response.to_upload.push(file.path.clone()),
            }
        }
        response.deleted = stored
            .keys()
            .filter(|path| !files.iter().any(|f| &f.path == *path))
            .cloned()
            .collect();
        response.summary = Some(SyncSummary {
            to_upload: response.to_upload.len(),
            to_update: response.to_update.len(),
            deleted: response.deleted.len(),
            unchanged: response.unchanged.len(),
        });
        Ok(response)
    }

    async fn publish_files(
        &self,
        site_id: &str,
        files: &[FileRecord],
    ) -> Result<Vec<UploadDirective>> {
        self.begin(ApiCall::PublishFiles {
            site_id: site_id.to_string(),
            paths: files.iter().map(|f| f.path.clone()).collect(),
        })?;

        let mut state = self.state();
        let stored = Self::stored_for(&state, site_id)?;

        let needed: Vec<FileRecord> = files
            .iter()
            .filter(|file| stored.get(&file.path).is_none_or(|existing| existing.sha != file.sha))
            .cloned()
            .collect();

        let mut directives = Vec::with_capacity(needed.len());
        for record in needed {
            let upload_url = format!("{}/{}/{}", STORAGE_BASE, site_id, record.path);
            directives.push(UploadDirective {
                path: record.path.clone(),
                upload_url: upload_url.clone(),
                content_type: content_type_for(&record.path).to_string(),
            });
            state.pending.insert(
                upload_url,
                PendingUpload {
                    site_id: site_id.to_string(),
                    record,
                },
            );
        }
        Ok(directives)
    }

    async fn delete_files(&self, site_id: &str, paths: &[String]) -> Result<DeleteResponse> {
        self.begin(ApiCall::DeleteFiles {
            site_id: site_id.to_string(),
            paths: paths.to_vec(),
        })?;

        let mut state = self.state();
        Self::stored_for(&state, site_id)?;
        let stored = state.stored.entry(site_id.to_string()).or_default();

        let mut response = DeleteResponse::default();
        for path in paths {
            if stored.remove(path).is_some() {
                response.deleted.push(path.clone());
            } else {
                response.not_found.push(path.clone());
            }
        }
        Ok(response)
    }

    async fn upload_to_storage(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let path = self
            .state()
            .pending
            .get(upload_url)
            .map(|pending| pending.record.path.clone())
            .unwrap_or_default();
        self.begin(ApiCall::UploadToStorage {
            path: path.clone(),
            size: bytes.len(),
            content_type: content_type.to_string(),
        })?;

        let mut state = self.state();
        if let Some(error) = state.fail_uploads.get(&path) {
            return Err(error.clone());
        }
        let Some(pending) = state.pending.remove(upload_url) else {
            return Err(Error::from_status(CallKind::Storage, 403, "upload URL is not valid"));
        };

        state.uploads.push((pending.record.path.clone(), bytes));
        state
            .stored
            .entry(pending.site_id)
            .or_default()
            .insert(pending.record.path.clone(), pending.record);
        Ok(())
    }
}
