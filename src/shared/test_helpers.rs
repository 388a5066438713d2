use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::features::ingestion::clients::{RegionSource, SourceError};
use crate::features::regions::models::{AdminUnit, Province, UpsertAdminUnit, UpsertProvince};
use crate::features::regions::store::{RegionStore, StoreError};

pub fn upsert_province(id: i32, name: &str) -> UpsertProvince {
    UpsertProvince {
        id,
        name: name.to_string(),
        code: Some(id),
    }
}

pub fn upsert_unit(id: i32, province_id: i32, name: &str) -> UpsertAdminUnit {
    UpsertAdminUnit {
        id,
        province_id,
        name: name.to_string(),
        level: "phuong".to_string(),
        code: format!("{:05}", id),
        pre_merger_description: None,
        latitude: 21.0,
        longitude: 105.8,
    }
}

pub fn sample_province(id: i32, name: &str) -> Province {
    let p = upsert_province(id, name);
    Province {
        id: p.id,
        name: p.name,
        code: p.code,
        updated_at: Utc::now(),
    }
}

pub fn sample_unit(id: i32, province_id: i32, name: &str) -> AdminUnit {
    to_row(&upsert_unit(id, province_id, name))
}

fn to_row(unit: &UpsertAdminUnit) -> AdminUnit {
    AdminUnit {
        id: unit.id,
        province_id: unit.province_id,
        name: unit.name.clone(),
        level: unit.level.clone(),
        code: unit.code.clone(),
        pre_merger_description: unit.pre_merger_description.clone(),
        latitude: unit.latitude,
        longitude: unit.longitude,
        updated_at: Utc::now(),
    }
}

/// Scriptable stand-in for the remote source
#[derive(Default)]
pub struct FakeRegionSource {
    provinces: Mutex<Vec<UpsertProvince>>,
    units: Mutex<HashMap<i32, Vec<UpsertAdminUnit>>>,
    province_failures_left: AtomicU32,
    failing_units: Mutex<HashSet<i32>>,
    province_requests: AtomicU32,
    unit_requests: Mutex<Vec<i32>>,
    cancel_after: Mutex<Option<(i32, CancellationToken)>>,
}

impl FakeRegionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_provinces(&self, provinces: Vec<UpsertProvince>) {
        *self.provinces.lock().unwrap() = provinces;
    }

    pub fn set_units(&self, province_id: i32, units: Vec<UpsertAdminUnit>) {
        self.units.lock().unwrap().insert(province_id, units);
    }

    /// The next `times` province fetches fail with a 503
    pub fn fail_province_list(&self, times: u32) {
        self.province_failures_left.store(times, Ordering::SeqCst);
    }

    pub fn fail_units(&self, province_id: i32) {
        self.failing_units.lock().unwrap().insert(province_id);
    }

    /// Cancels `token` right after units for `province_id` are returned
    pub fn cancel_after_units_of(&self, province_id: i32, token: CancellationToken) {
        *self.cancel_after.lock().unwrap() = Some((province_id, token));
    }

    pub fn province_requests(&self) -> u32 {
        self.province_requests.load(Ordering::SeqCst)
    }

    pub fn unit_requests(&self) -> Vec<i32> {
        self.unit_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegionSource for FakeRegionSource {
    async fn fetch_provinces(&self) -> Result<Vec<UpsertProvince>, SourceError> {
        self.province_requests.fetch_add(1, Ordering::SeqCst);

        let failures_left = self.province_failures_left.load(Ordering::SeqCst);
        if failures_left > 0 {
            if failures_left != u32::MAX {
                self.province_failures_left
                    .store(failures_left - 1, Ordering::SeqCst);
            }
            return Err(SourceError::Status { status: 503 });
        }

        Ok(self.provinces.lock().unwrap().clone())
    }

    async fn fetch_units(&self, province_id: i32) -> Result<Vec<UpsertAdminUnit>, SourceError> {
        self.unit_requests.lock().unwrap().push(province_id);

        if self.failing_units.lock().unwrap().contains(&province_id) {
            return Err(SourceError::Parse("unexpected payload".to_string()));
        }

        let units = self
            .units
            .lock()
            .unwrap()
            .get(&province_id)
            .cloned()
            .unwrap_or_default();

        if let Some((id, token)) = self.cancel_after.lock().unwrap().as_ref() {
            if *id == province_id {
                token.cancel();
            }
        }

        Ok(units)
    }
}

/// Store fake with the same keyed-upsert and foreign key semantics as Postgres
#[derive(Default)]
pub struct InMemoryRegionStore {
    provinces: Mutex<BTreeMap<i32, Province>>,
    units: Mutex<BTreeMap<i32, AdminUnit>>,
    failing_provinces: Mutex<HashSet<i32>>,
    failing_units: Mutex<HashSet<i32>>,
    ping_fails: AtomicBool,
    reads: AtomicU32,
}

impl InMemoryRegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_province(&self, id: i32) {
        self.failing_provinces.lock().unwrap().insert(id);
    }

    pub fn fail_unit(&self, id: i32) {
        self.failing_units.lock().unwrap().insert(id);
    }

    pub fn fail_ping(&self) {
        self.ping_fails.store(true, Ordering::SeqCst);
    }

    /// Number of list reads served, to observe cache hits
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Stored rows without `updated_at`
    pub fn snapshot(&self) -> (Vec<UpsertProvince>, Vec<UpsertAdminUnit>) {
        let provinces = self
            .provinces
            .lock()
            .unwrap()
            .values()
            .map(|p| UpsertProvince {
                id: p.id,
                name: p.name.clone(),
                code: p.code,
            })
            .collect();
        let units = self
            .units
            .lock()
            .unwrap()
            .values()
            .map(|u| UpsertAdminUnit {
                id: u.id,
                province_id: u.province_id,
                name: u.name.clone(),
                level: u.level.clone(),
                code: u.code.clone(),
                pre_merger_description: u.pre_merger_description.clone(),
                latitude: u.latitude,
                longitude: u.longitude,
            })
            .collect();
        (provinces, units)
    }
}

#[async_trait]
impl RegionStore for InMemoryRegionStore {
    async fn upsert_province(&self, province: &UpsertProvince) -> Result<(), StoreError> {
        if self.failing_provinces.lock().unwrap().contains(&province.id) {
            return Err(StoreError::Rejected(format!("province {}", province.id)));
        }

        self.provinces.lock().unwrap().insert(
            province.id,
            Province {
                id: province.id,
                name: province.name.clone(),
                code: province.code,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn upsert_unit(&self, unit: &UpsertAdminUnit) -> Result<(), StoreError> {
        if self.failing_units.lock().unwrap().contains(&unit.id) {
            return Err(StoreError::Rejected(format!("unit {}", unit.id)));
        }
        if !self.provinces.lock().unwrap().contains_key(&unit.province_id) {
            return Err(StoreError::Rejected(format!(
                "unit {} references unknown province {}",
                unit.id, unit.province_id
            )));
        }

        self.units.lock().unwrap().insert(unit.id, to_row(unit));
        Ok(())
    }

    async fn list_provinces(&self) -> Result<Vec<Province>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.provinces.lock().unwrap().values().cloned().collect())
    }

    async fn list_units_by_province(
        &self,
        province_id: i32,
    ) -> Result<Vec<AdminUnit>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .units
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.province_id == province_id)
            .cloned()
            .collect())
    }

    async fn search_units(&self, term: &str, limit: i64) -> Result<Vec<AdminUnit>, StoreError> {
        let needle = term.to_lowercase();
        Ok(self
            .units
            .lock()
            .unwrap()
            .values()
            .filter(|u| {
                u.name.to_lowercase().contains(&needle)
                    || u
                        .pre_merger_description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.ping_fails.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("database unreachable".to_string()));
        }
        Ok(())
    }
}
