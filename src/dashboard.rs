//! The render pass: resolve every artifact, parse, aggregate.

use chrono::{DateTime, Local};
use image::imageops::FilterType;
use image::{GenericImageView, RgbImage};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{CacheSource, FetchMode, FileCache};
use crate::config::{CacheFiles, Config, DisplayConfig, ImageIds, ProfileConfig};
use crate::error::{DashError, DashResult};
use crate::google::auth::Authenticator;
use crate::google::drive::DEFAULT_DRIVE_URL;
use crate::google::sheets::DEFAULT_SHEETS_URL;
use crate::google::{base_url, DriveClient, SheetGrid, SheetsClient};
use crate::metrics::{aggregate, category_detail, Aggregates};
use crate::records::{parse_cv, parse_tools, CvRecord, ToolRecord};
use crate::tenure::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
  Photo,
  Certificate,
  Demo1,
  Demo2,
}

impl ImageSlot {
  pub const ALL: [ImageSlot; 4] = [
    ImageSlot::Photo,
    ImageSlot::Certificate,
    ImageSlot::Demo1,
    ImageSlot::Demo2,
  ];

  pub fn file_id(self, ids: &ImageIds) -> Option<&str> {
    match self {
      ImageSlot::Photo => ids.photo.as_deref(),
      ImageSlot::Certificate => ids.certificate.as_deref(),
      ImageSlot::Demo1 => ids.demo1.as_deref(),
      ImageSlot::Demo2 => ids.demo2.as_deref(),
    }
  }

  pub fn cache_key(self, files: &CacheFiles) -> &str {
    match self {
      ImageSlot::Photo => &files.photo,
      ImageSlot::Certificate => &files.certificate,
      ImageSlot::Demo1 => &files.demo1,
      ImageSlot::Demo2 => &files.demo2,
    }
  }

  /// Target width in terminal columns
  pub fn width(self, display: &DisplayConfig) -> u16 {
    match self {
      ImageSlot::Photo => display.photo_width,
      ImageSlot::Certificate => display.certificate_width,
      ImageSlot::Demo1 | ImageSlot::Demo2 => display.demo_width,
    }
  }

  /// Slot of the n-th demo project's screenshot.
  pub fn demo(index: usize) -> Option<ImageSlot> {
    match index {
      0 => Some(ImageSlot::Demo1),
      1 => Some(ImageSlot::Demo2),
      _ => None,
    }
  }
}

/// Where one cache entry of the pass came from.
#[derive(Debug, Clone)]
pub struct ArtifactStatus {
  pub key: String,
  pub source: CacheSource,
  pub modified_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
  Start,
  Company,
  Position,
  Tenure,
}

impl SortKey {
  pub fn next(self) -> Self {
    match self {
      SortKey::Start => SortKey::Company,
      SortKey::Company => SortKey::Position,
      SortKey::Position => SortKey::Tenure,
      SortKey::Tenure => SortKey::Start,
    }
  }

  fn compare(self, a: &CvRecord, b: &CvRecord) -> Ordering {
    match self {
      SortKey::Start => a.start.cmp(&b.start),
      SortKey::Company => a.company.to_lowercase().cmp(&b.company.to_lowercase()),
      SortKey::Position => a.position.to_lowercase().cmp(&b.position.to_lowercase()),
      SortKey::Tenure => a.tenure_days().cmp(&b.tenure_days()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySort {
  pub key: SortKey,
  pub descending: bool,
}

impl Default for HistorySort {
  fn default() -> Self {
    Self {
      key: SortKey::Start,
      descending: true,
    }
  }
}

/// Everything one render pass produced. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dashboard {
  pub profile: ProfileConfig,
  pub locale: Locale,
  /// Work history, newest first
  pub cv: Vec<CvRecord>,
  pub tools: Vec<ToolRecord>,
  pub aggregates: Aggregates,
  pub pictures: HashMap<ImageSlot, RgbImage>,
  pub statuses: Vec<ArtifactStatus>,
  pub loaded_at: DateTime<Local>,
}

impl Dashboard {
  /// Assemble a dashboard from already-resolved tables.
  pub fn build(
    config: &Config,
    cv_grid: &SheetGrid,
    tools_grid: &SheetGrid,
  ) -> DashResult<Self> {
    let mut cv = parse_cv(cv_grid, &config.columns.cv)?;
    cv.sort_by(|a, b| b.start.cmp(&a.start));

    let tools = parse_tools(tools_grid, &config.columns.tools)?;
    let aggregates = aggregate(&tools);

    Ok(Self {
      profile: config.profile.clone(),
      locale: config.locale,
      cv,
      tools,
      aggregates,
      pictures: HashMap::new(),
      statuses: Vec::new(),
      loaded_at: Local::now(),
    })
  }

  pub fn picture(&self, slot: ImageSlot) -> Option<&RgbImage> {
    self.pictures.get(&slot)
  }

  pub fn category_detail(&self, category: &str) -> Vec<&ToolRecord> {
    category_detail(&self.tools, category)
  }

  /// Work history in the requested order; ties keep newest-first order.
  pub fn history(&self, sort: HistorySort) -> Vec<&CvRecord> {
    let mut rows: Vec<&CvRecord> = self.cv.iter().collect();
    rows.sort_by(|a, b| {
      let ord = sort.key.compare(a, b);
      if sort.descending {
        ord.reverse()
      } else {
        ord
      }
    });
    rows
  }

  /// The cache entry written longest ago, if any artifact was served from disk.
  pub fn oldest_entry(&self) -> Option<&ArtifactStatus> {
    self
      .statuses
      .iter()
      .filter(|s| s.modified_at.is_some())
      .min_by_key(|s| s.modified_at)
  }

  /// The least fresh source of the pass, for the status line.
  pub fn overall_source(&self) -> CacheSource {
    let sources = self.statuses.iter().map(|s| s.source);
    if sources.clone().any(|s| s == CacheSource::Offline) {
      CacheSource::Offline
    } else if sources.clone().any(|s| s == CacheSource::Network) {
      CacheSource::Network
    } else {
      CacheSource::CacheFresh
    }
  }
}

/// Decode image bytes and scale them to `width` pixels, keeping the aspect ratio.
pub fn decode_picture(key: &str, bytes: &[u8], width: u16) -> DashResult<RgbImage> {
  let decoded = image::load_from_memory(bytes).map_err(|e| DashError::InvalidImage {
    key: key.to_string(),
    message: e.to_string(),
  })?;

  let (w, h) = decoded.dimensions();
  if w == 0 || h == 0 {
    return Err(DashError::InvalidImage {
      key: key.to_string(),
      message: "image has no pixels".to_string(),
    });
  }

  let target_w = u32::from(width.max(1));
  let target_h = ((f64::from(target_w) * f64::from(h) / f64::from(w)).round() as u32).max(1);
  Ok(
    decoded
      .resize_exact(target_w, target_h, FilterType::Triangle)
      .to_rgb8(),
  )
}

/// Runs render passes against Google and the local cache.
pub struct DashboardLoader {
  sheets: SheetsClient,
  drive: DriveClient,
  cache: FileCache,
  config: Config,
}

impl DashboardLoader {
  /// Build clients and cache from configuration.
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("cvdash/", env!("CARGO_PKG_VERSION")))
      .build()?;
    let auth = Arc::new(Authenticator::new(config, http.clone())?);
    let cache = FileCache::new(config.cache_dir()).with_stale_fallback(config.cache.stale_fallback);
    Self::with_auth(config, http, auth, cache)
  }

  pub fn with_auth(
    config: &Config,
    http: reqwest::Client,
    auth: Arc<Authenticator>,
    cache: FileCache,
  ) -> color_eyre::Result<Self> {
    let sheets_url = base_url(config.google.sheets_url.as_deref().unwrap_or(DEFAULT_SHEETS_URL))?;
    let drive_url = base_url(config.google.drive_url.as_deref().unwrap_or(DEFAULT_DRIVE_URL))?;

    Ok(Self {
      sheets: SheetsClient::new(http.clone(), auth.clone(), sheets_url),
      drive: DriveClient::new(http, auth, drive_url),
      cache,
      config: config.clone(),
    })
  }

  /// One render pass. Artifacts are resolved one after another; the first
  /// error aborts the pass.
  pub async fn load(&self, mode: FetchMode) -> DashResult<Dashboard> {
    info!(?mode, cache_dir = %self.cache.root().display(), "loading dashboard");
    let google = &self.config.google;
    let files = &self.config.cache.files;
    let mut statuses = Vec::new();

    let cv = self
      .cache
      .resolve(&files.cv, mode, || {
        self.sheets.get_range(&google.spreadsheet_id, &google.cv_range)
      })
      .await?;
    statuses.push(status(&files.cv, cv.source, cv.modified_at));

    let tools = self
      .cache
      .resolve(&files.tools, mode, || {
        self.sheets.get_range(&google.spreadsheet_id, &google.tools_range)
      })
      .await?;
    statuses.push(status(&files.tools, tools.source, tools.modified_at));

    debug!(
      cv_fetched_at = %cv.data.fetched_at,
      tools_fetched_at = %tools.data.fetched_at,
      "sheet snapshots resolved"
    );
    let mut dashboard = Dashboard::build(&self.config, &cv.data, &tools.data)?;

    for slot in ImageSlot::ALL {
      let key = slot.cache_key(files);
      let Some(file_id) = slot.file_id(&google.images) else {
        warn!(?slot, key, "no drive file id configured, picture skipped");
        continue;
      };

      let (picture, picture_status) = self.load_picture(slot, file_id, mode).await?;
      statuses.push(picture_status);
      dashboard.pictures.insert(slot, picture);
    }

    for warning in dashboard.aggregates.warnings() {
      warn!("{}", warning);
    }

    dashboard.statuses = statuses;
    info!(
      history = dashboard.cv.len(),
      tools = dashboard.tools.len(),
      categories = dashboard.aggregates.ranked.len(),
      "dashboard loaded"
    );
    Ok(dashboard)
  }
}

impl DashboardLoader {
  /// Resolve and decode one picture.
  ///
  /// Drive may answer 200 with a non-image body, which then sits in the cache
  /// as today's entry. A cached body that does not decode is fetched once more.
  async fn load_picture(
    &self,
    slot: ImageSlot,
    file_id: &str,
    mode: FetchMode,
  ) -> DashResult<(RgbImage, ArtifactStatus)> {
    let key = slot.cache_key(&self.config.cache.files);
    let width = slot.width(&self.config.display);

    let bytes = self
      .cache
      .resolve_stream(key, mode, || self.drive.download(file_id))
      .await?;
    let bytes = match decode_picture(key, &bytes.data, width) {
      Ok(picture) => return Ok((picture, status(key, bytes.source, bytes.modified_at))),
      Err(err) if bytes.source == CacheSource::Network => return Err(err),
      Err(err) => {
        warn!(key, error = %err, "cached picture does not decode, fetching it again");
        self
          .cache
          .resolve_stream(key, FetchMode::Force, || self.drive.download(file_id))
          .await?
      }
    };

    let picture = decode_picture(key, &bytes.data, width)?;
    Ok((picture, status(key, bytes.source, bytes.modified_at)))
  }
}

fn status(key: &str, source: CacheSource, modified_at: Option<DateTime<Local>>) -> ArtifactStatus {
  ArtifactStatus {
    key: key.to_string(),
    source,
    modified_at,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use httpmock::prelude::*;
  use image::{ImageOutputFormat, Rgb};
  use serde_json::json;
  use std::io::Cursor;

  fn config(extra: &str) -> Config {
    let yaml = format!("google:\n  spreadsheet_id: sheet-123\n{}", extra);
    serde_yaml::from_str(&yaml).unwrap()
  }

  fn grid(range: &str, rows: &[&[&str]]) -> SheetGrid {
    let values = rows
      .iter()
      .map(|r| r.iter().map(|c| c.to_string()).collect())
      .collect();
    SheetGrid::from_values(range, values).unwrap()
  }

  fn cv_grid() -> SheetGrid {
    grid(
      "f_cv",
      &[
        &["начало", "конец", "компания", "должность", "суть работы", "достижения"],
        &["01.03.2015", "01.03.2018", "Initech", "Analyst", "", ""],
        &["01.04.2018", "06.05.2019", "acme", "Lead analyst", "", ""],
        &["01.06.2019", "01.07.2019", "Globex", "Consultant", "", ""],
      ],
    )
  }

  fn tools_grid() -> SheetGrid {
    grid(
      "f_tools",
      &[
        &["группа1", "инструмент", "Экспертиза", "вес", "комментарий"],
        &["BI", "Power BI", "90", "2", "DAX"],
        &["SQL", "PostgreSQL", "60", "1", ""],
        &["BI", "Tableau", "60", "1", ""],
      ],
    )
  }

  fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([25, 91, 127]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image)
      .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
      .unwrap();
    bytes
  }

  #[test]
  fn test_build_sorts_history_newest_first() {
    let dashboard = Dashboard::build(&config(""), &cv_grid(), &tools_grid()).unwrap();

    let companies: Vec<&str> = dashboard.cv.iter().map(|r| r.company.as_str()).collect();
    assert_eq!(companies, vec!["Globex", "acme", "Initech"]);
    assert_eq!(
      dashboard.cv[0].start,
      NaiveDate::from_ymd_opt(2019, 6, 1).unwrap()
    );
  }

  #[test]
  fn test_build_aggregates_categories() {
    let dashboard = Dashboard::build(&config(""), &cv_grid(), &tools_grid()).unwrap();

    let bi = dashboard.aggregates.get("BI").unwrap();
    assert_eq!(bi.mean, 80);
    assert_eq!(dashboard.aggregates.ranked[0].category, "BI");
    let detail: Vec<&str> = dashboard
      .category_detail("BI")
      .into_iter()
      .map(|t| t.tool.as_str())
      .collect();
    assert_eq!(detail, vec!["Power BI", "Tableau"]);
  }

  #[test]
  fn test_build_propagates_data_shape_errors() {
    let bad = grid(
      "f_tools",
      &[
        &["группа1", "инструмент", "Экспертиза", "вес", "комментарий"],
        &["BI", "Power BI", "a lot", "2", ""],
      ],
    );
    let err = Dashboard::build(&config(""), &cv_grid(), &bad).unwrap_err();
    assert!(matches!(err, DashError::DataShape { .. }));
  }

  #[test]
  fn test_history_sorting() {
    let dashboard = Dashboard::build(&config(""), &cv_grid(), &tools_grid()).unwrap();
    let companies = |sort: HistorySort| -> Vec<String> {
      dashboard
        .history(sort)
        .into_iter()
        .map(|r| r.company.clone())
        .collect()
    };

    assert_eq!(
      companies(HistorySort::default()),
      vec!["Globex", "acme", "Initech"]
    );
    assert_eq!(
      companies(HistorySort {
        key: SortKey::Company,
        descending: false
      }),
      vec!["acme", "Globex", "Initech"]
    );
    assert_eq!(
      companies(HistorySort {
        key: SortKey::Tenure,
        descending: true
      }),
      vec!["Initech", "acme", "Globex"]
    );
  }

  #[test]
  fn test_oldest_entry_ignores_network_artifacts() {
    use chrono::TimeZone;

    let mut dashboard = Dashboard::build(&config(""), &cv_grid(), &tools_grid()).unwrap();
    assert!(dashboard.oldest_entry().is_none());

    let morning = Local.with_ymd_and_hms(2026, 10, 18, 9, 12, 0).unwrap();
    let noon = Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    dashboard.statuses = vec![
      status("f_cv.json", CacheSource::CacheFresh, Some(noon)),
      status("photo_ava.jpg", CacheSource::Network, None),
      status("f_tools.json", CacheSource::Offline, Some(morning)),
    ];

    assert_eq!(dashboard.oldest_entry().unwrap().key, "f_tools.json");
  }

  #[test]
  fn test_sort_key_cycles() {
    let mut key = SortKey::Start;
    for _ in 0..4 {
      key = key.next();
    }
    assert_eq!(key, SortKey::Start);
  }

  #[test]
  fn test_decode_picture_keeps_aspect_ratio() {
    let picture = decode_picture("photo_ava.jpg", &png_bytes(40, 80), 10).unwrap();
    assert_eq!(picture.dimensions(), (10, 20));
  }

  #[test]
  fn test_decode_garbage_is_invalid_image() {
    let err = decode_picture("demo1.jpg", b"<html>quota exceeded</html>", 10).unwrap_err();
    assert!(matches!(err, DashError::InvalidImage { ref key, .. } if key == "demo1.jpg"));
  }

  fn values(grid: &SheetGrid) -> Vec<Vec<String>> {
    let mut values = vec![grid.header.clone()];
    values.extend(grid.rows.iter().cloned());
    values
  }

  async fn mock_google(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
    let tools_mock = mock_sheets(server).await;
    let photo_mock = mock_photo(server, png_bytes(8, 8)).await;
    (tools_mock, photo_mock)
  }

  async fn mock_photo(server: &MockServer, body: Vec<u8>) -> httpmock::Mock<'_> {
    server
      .mock_async(move |when, then| {
        when.method(GET).path("/drive/v3/files/photo-id");
        then.status(200).body(body);
      })
      .await
  }

  async fn mock_sheets(server: &MockServer) -> httpmock::Mock<'_> {
    let cv = json!({"valueRanges": [{"range": "f_cv!A1:F4", "values": values(&cv_grid())}]});
    let tools = json!({"valueRanges": [{"range": "f_tools!A1:E4", "values": values(&tools_grid())}]});

    server
      .mock_async(move |when, then| {
        when
          .method(GET)
          .path("/v4/spreadsheets/sheet-123/values:batchGet")
          .query_param("ranges", "f_cv");
        then.status(200).json_body(cv);
      })
      .await;
    let tools_mock = server
      .mock_async(move |when, then| {
        when
          .method(GET)
          .path("/v4/spreadsheets/sheet-123/values:batchGet")
          .query_param("ranges", "f_tools");
        then.status(200).json_body(tools);
      })
      .await;
    tools_mock
  }

  fn loader(server: &MockServer, cache_dir: &std::path::Path) -> DashboardLoader {
    let config = config(&format!(
      "  sheets_url: {url}\n  drive_url: {url}\n  images:\n    photo: photo-id\n",
      url = server.base_url()
    ));
    let http = reqwest::Client::new();
    let auth = Arc::new(Authenticator::with_token(http.clone(), "ya29.test"));
    DashboardLoader::with_auth(&config, http, auth, FileCache::new(cache_dir)).unwrap()
  }

  #[tokio::test]
  async fn test_load_fetches_once_per_day() {
    let server = MockServer::start_async().await;
    let (tools_mock, photo_mock) = mock_google(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let loader = loader(&server, dir.path());

    let first = loader.load(FetchMode::IfStale).await.unwrap();
    assert_eq!(first.overall_source(), CacheSource::Network);
    assert!(first.picture(ImageSlot::Photo).is_some());
    assert!(first.picture(ImageSlot::Demo1).is_none());
    assert!(dir.path().join("f_tools.json").exists());
    assert!(dir.path().join("photo_ava.jpg").exists());

    let second = loader.load(FetchMode::IfStale).await.unwrap();
    assert_eq!(second.overall_source(), CacheSource::CacheFresh);
    assert_eq!(second.aggregates, first.aggregates);

    // Each mock must have been hit exactly once across both passes
    tools_mock.assert_async().await;
    photo_mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_undecodable_cached_picture_is_fetched_again() {
    let server = MockServer::start_async().await;
    mock_sheets(&server).await;
    let mut quota_page = mock_photo(&server, b"<html>quota exceeded</html>".to_vec()).await;
    let dir = tempfile::tempdir().unwrap();
    let loader = loader(&server, dir.path());

    let err = loader.load(FetchMode::IfStale).await.unwrap_err();
    assert!(matches!(err, DashError::InvalidImage { ref key, .. } if key == "photo_ava.jpg"));

    // Drive recovers; a plain retry must reach it despite today's entry
    quota_page.delete_async().await;
    let photo = mock_photo(&server, png_bytes(8, 8)).await;

    let dashboard = loader.load(FetchMode::IfStale).await.unwrap();
    assert!(dashboard.picture(ImageSlot::Photo).is_some());
    assert_eq!(photo.hits_async().await, 1);

    let photo_status = dashboard
      .statuses
      .iter()
      .find(|s| s.key == "photo_ava.jpg")
      .unwrap();
    assert_eq!(photo_status.source, CacheSource::Network);
  }

  #[tokio::test]
  async fn test_load_aborts_on_remote_failure() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/v4/spreadsheets/sheet-123/values:batchGet");
        then.status(500).body("backend error");
      })
      .await;
    let dir = tempfile::tempdir().unwrap();

    let err = loader(&server, dir.path())
      .load(FetchMode::IfStale)
      .await
      .unwrap_err();

    assert!(matches!(err, DashError::RemoteFetch { .. }));
    assert!(!dir.path().join("f_cv.json").exists());
  }
}
