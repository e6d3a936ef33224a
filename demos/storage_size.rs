use keystore_errors::storage::{AppStorageRef, StorageSizeSlot, StorageStats, StorageStatsSource};
use keystore_errors::UserHandle;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Stand-in for the platform stats service; answers slowly.
struct SlowStats;

impl StorageStatsSource for SlowStats {
    fn query_stats_for_package(
        &self,
        _volume: Option<Uuid>,
        package_name: &str,
        _user: UserHandle,
    ) -> io::Result<StorageStats> {
        std::thread::sleep(Duration::from_millis(50));
        match package_name {
            "com.example.camera" => Ok(StorageStats::new(48_000_000, 1_200_000_000, 310_000_000)),
            "com.example.notes" => Ok(StorageStats::new(6_500_000, 240_000, 12_000)),
            _ => Err(io::Error::new(io::ErrorKind::NotFound, "package not installed")),
        }
    }
}

#[tokio::main]
async fn main() {
    let source = Arc::new(SlowStats);
    let slot = StorageSizeSlot::new();

    for package in ["com.example.camera", "com.example.notes", "com.example.gone"] {
        let app = AppStorageRef::new(None, package, UserHandle::of(0));
        match slot.refresh(Arc::clone(&source), app).await {
            Ok(size) => println!("{package:<22} {size}"),
            Err(e) => println!("{package:<22} error: {e}"),
        }
    }

    println!("\nslot holds: {:?}", slot.current());
}
