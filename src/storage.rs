//! On-disk size of an installed app, formatted for display.
//!
//! The size is the sum of the app's code, data and cache bytes as reported by
//! a [`StorageStatsSource`]. Queries block, so the async form hops onto the
//! runtime's blocking pool and computes exactly once per call.
//!
//! ```rust
//! use keystore_errors::storage::{app_storage_size, AppStorageRef, StorageStats, StorageStatsSource};
//! use keystore_errors::UserHandle;
//! use std::io;
//!
//! struct Fixed;
//!
//! impl StorageStatsSource for Fixed {
//!     fn query_stats_for_package(
//!         &self,
//!         _volume: Option<uuid::Uuid>,
//!         _package_name: &str,
//!         _user: UserHandle,
//!     ) -> io::Result<StorageStats> {
//!         Ok(StorageStats::new(1_000_000, 400_000, 100_000))
//!     }
//! }
//!
//! let app = AppStorageRef::new(None, "com.example.app", UserHandle::of(0));
//! assert_eq!(app_storage_size(&Fixed, &app).unwrap(), "1.50 MB");
//! ```

use crate::selection::UserHandle;
use std::io;
use std::sync::Mutex;
use uuid::Uuid;

#[cfg(any(feature = "tokio", feature = "async_std"))]
use std::sync::Arc;

const UNITS: [&str; 6] = ["B", "kB", "MB", "GB", "TB", "PB"];

/// Step to the next unit once a value passes this.
const UNIT_STEP_THRESHOLD: f64 = 900.0;

/// Byte counts for one package and user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageStats {
    /// Code and resources.
    pub app_bytes: u64,
    /// Private data.
    pub data_bytes: u64,
    /// Cache.
    pub cache_bytes: u64,
}

impl StorageStats {
    /// Build from the three counts.
    #[inline]
    pub const fn new(app_bytes: u64, data_bytes: u64, cache_bytes: u64) -> Self {
        Self { app_bytes, data_bytes, cache_bytes }
    }

    /// Sum of all three counts, saturating at `u64::MAX`.
    #[inline]
    pub const fn total(&self) -> u64 {
        self.app_bytes
            .saturating_add(self.data_bytes)
            .saturating_add(self.cache_bytes)
    }
}

/// Platform storage statistics service.
pub trait StorageStatsSource: Send + Sync {
    /// Blocking query for one package on one volume (`None` = internal storage).
    fn query_stats_for_package(
        &self,
        volume: Option<Uuid>,
        package_name: &str,
        user: UserHandle,
    ) -> io::Result<StorageStats>;
}

/// Which installed app to measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStorageRef {
    /// Volume holding the app; `None` for internal storage.
    pub volume: Option<Uuid>,
    /// Package name.
    pub package_name: String,
    /// Owning user.
    pub user: UserHandle,
}

impl AppStorageRef {
    /// Describe an installed app.
    pub fn new(volume: Option<Uuid>, package_name: impl Into<String>, user: UserHandle) -> Self {
        Self { volume, package_name: package_name.into(), user }
    }
}

/// Human-readable size with SI units.
///
/// Whole numbers for bytes and for values of 100 or more; two decimals
/// otherwise.
///
/// ```rust
/// # use keystore_errors::storage::format_file_size;
/// assert_eq!(format_file_size(512), "512 B");
/// assert_eq!(format_file_size(950), "0.95 kB");
/// assert_eq!(format_file_size(1_500_000), "1.50 MB");
/// assert_eq!(format_file_size(250_000_000), "250 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value > UNIT_STEP_THRESHOLD && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 || value >= 100.0 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

/// Query once, sum, format. Source errors propagate unchanged.
pub fn app_storage_size<S>(source: &S, app: &AppStorageRef) -> io::Result<String>
where
    S: StorageStatsSource + ?Sized,
{
    let stats = source.query_stats_for_package(app.volume, &app.package_name, app.user)?;
    Ok(format_file_size(stats.total()))
}

/// [`app_storage_size`] on the async runtime's blocking pool.
///
/// Uses tokio when the `tokio` feature is enabled, otherwise async-std.
/// A join failure of the blocking task is reported as `ErrorKind::Other`.
#[cfg(any(feature = "tokio", feature = "async_std"))]
pub async fn app_storage_size_async<S>(source: Arc<S>, app: AppStorageRef) -> io::Result<String>
where
    S: StorageStatsSource + 'static,
{
    #[cfg(feature = "tokio")]
    {
        tokio::task::spawn_blocking(move || app_storage_size(source.as_ref(), &app))
            .await
            .map_err(|e| io::Error::other(format!("storage query task failed: {e}")))?
    }

    #[cfg(all(feature = "async_std", not(feature = "tokio")))]
    {
        async_std::task::spawn_blocking(move || app_storage_size(source.as_ref(), &app)).await
    }
}

/// Last formatted size for one observer.
///
/// Each refresh overwrites the previous value. There is no cancellation and
/// no ordering between overlapping refreshes.
#[derive(Debug, Default)]
pub struct StorageSizeSlot {
    value: Mutex<Option<String>>,
}

impl StorageSizeSlot {
    /// Empty slot.
    pub const fn new() -> Self {
        Self { value: Mutex::new(None) }
    }

    /// Last published size, if any.
    pub fn current(&self) -> Option<String> {
        match self.value.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the held size.
    pub fn publish(&self, size: impl Into<String>) {
        let size = size.into();
        match self.value.lock() {
            Ok(mut guard) => *guard = Some(size),
            Err(poisoned) => *poisoned.into_inner() = Some(size),
        }
    }

    /// Compute off the calling task and publish the result.
    ///
    /// On error the previous value is left in place.
    #[cfg(any(feature = "tokio", feature = "async_std"))]
    pub async fn refresh<S>(&self, source: Arc<S>, app: AppStorageRef) -> io::Result<String>
    where
        S: StorageStatsSource + 'static,
    {
        let size = app_storage_size_async(source, app).await?;
        self.publish(size.clone());
        Ok(size)
    }
}
