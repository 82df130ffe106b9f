// ==========================================
// 包裹派送管理后台 - 司机路线 API
// ==========================================
// 职责: 司机工作量概览；单个司机的路线分组详情
// 说明: 仅面向在岗司机；路线分组由 RoutePartitioner 计算，不落库
// ==========================================

use std::sync::Arc;

use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::api::parcel_api::MSG_DRIVER_UNAVAILABLE;
use crate::domain::route::{DriverRoutes, DriverWorkload};
use crate::engine::RoutePartitioner;
use crate::repository::driver_repo::DriverRepository;
use crate::repository::parcel_repo::ParcelRepository;

// ==========================================
// RouteApi - 司机路线 API
// ==========================================
pub struct RouteApi {
    driver_repo: Arc<DriverRepository>,
    parcel_repo: Arc<ParcelRepository>,
    partitioner: RoutePartitioner,
}

impl RouteApi {
    pub fn new(driver_repo: Arc<DriverRepository>, parcel_repo: Arc<ParcelRepository>) -> Self {
        Self {
            driver_repo,
            parcel_repo,
            partitioner: RoutePartitioner::new(),
        }
    }

    /// 在岗司机工作量（包裹总数降序，姓名升序）
    pub fn list_driver_workloads(&self) -> ApiResult<Vec<DriverWorkload>> {
        Ok(self.driver_repo.list_workloads()?)
    }

    /// 司机路线详情
    ///
    /// # 返回
    /// - Ok(DriverRoutes): 司机信息、按创建时间升序的包裹、路线分组
    /// - Err(NotFound): 司机不存在或不在岗
    pub fn get_driver_routes(&self, driver_id: i64) -> ApiResult<DriverRoutes> {
        let driver = self
            .driver_repo
            .find_active(driver_id)?
            .ok_or_else(|| ApiError::NotFound(MSG_DRIVER_UNAVAILABLE.to_string()))?;

        let parcels = self.parcel_repo.find_by_driver(driver_id)?;
        let routes = self.partitioner.partition(parcels.clone());
        debug!(driver_id, parcels = parcels.len(), routes = routes.len(), "路线分组完成");

        Ok(DriverRoutes {
            driver,
            total_parcels: parcels.len(),
            total_routes: routes.len(),
            parcels,
            routes,
        })
    }
}
