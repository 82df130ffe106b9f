// ==========================================
// 包裹派送管理后台 - 驾驶舱 API
// ==========================================
// 职责: 包裹按状态计数、司机总数/在岗数
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::error::ApiResult;
use crate::domain::driver::DriverStats;
use crate::domain::parcel::ParcelStats;
use crate::repository::driver_repo::DriverRepository;
use crate::repository::parcel_repo::ParcelRepository;

/// 驾驶舱统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub parcels: ParcelStats,
    pub drivers: DriverStats,
}

pub struct DashboardApi {
    parcel_repo: Arc<ParcelRepository>,
    driver_repo: Arc<DriverRepository>,
}

impl DashboardApi {
    pub fn new(parcel_repo: Arc<ParcelRepository>, driver_repo: Arc<DriverRepository>) -> Self {
        Self {
            parcel_repo,
            driver_repo,
        }
    }

    pub fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        Ok(DashboardStats {
            parcels: self.parcel_repo.stats()?,
            drivers: self.driver_repo.stats()?,
        })
    }
}
