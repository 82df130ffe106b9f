// ==========================================
// 包裹派送管理后台 - 司机管理 API
// ==========================================
// 职责: 司机列表、创建、更新、删除
// 规则:
//   - 姓名 / 手机 / 车牌 校验失败时原因以 ", " 拼接
//   - 坐标缺失或在服务区域外时自动生成
//   - 唯一索引为最终裁决；冲突提示优先级: 车牌 > 手机 > 姓名
//   - 名下仍有包裹时拒绝删除
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::MessageResponse;
use crate::domain::driver::{Driver, DriverInput, NewDriver};
use crate::engine::CoordinateAssigner;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::record_validator::RecordValidator;
use crate::repository::driver_repo::{DriverConflicts, DriverRepository};
use crate::repository::error::RepositoryError;

pub const MSG_DUPLICATE_VEHICLE: &str = "A driver with this vehicle number already exists";
pub const MSG_DUPLICATE_PHONE: &str = "A driver with this phone number already exists";
pub const MSG_DUPLICATE_NAME: &str = "A driver with this name already exists";
pub const MSG_DUPLICATE_DRIVER: &str = "This driver already exists (duplicate information)";
pub const MSG_DRIVER_HAS_PARCELS: &str =
    "Cannot delete driver with assigned parcels. Please reassign parcels first.";

/// 坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// 创建司机响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverCreatedResponse {
    pub message: String,
    pub driver_id: i64,
    pub coordinates: Coordinates,
}

/// 更新司机响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverUpdatedResponse {
    pub message: String,
    pub coordinates: Coordinates,
}

// ==========================================
// DriverApi - 司机管理 API
// ==========================================
pub struct DriverApi {
    driver_repo: Arc<DriverRepository>,
    validator: RecordValidator,
    cleaner: DataCleaner,
    coordinates: CoordinateAssigner,
}

impl DriverApi {
    pub fn new(driver_repo: Arc<DriverRepository>) -> Self {
        Self {
            driver_repo,
            validator: RecordValidator::new(),
            cleaner: DataCleaner,
            coordinates: CoordinateAssigner::default(),
        }
    }

    /// 司机列表（新建在前）
    pub fn list_drivers(&self) -> ApiResult<Vec<Driver>> {
        Ok(self.driver_repo.list()?)
    }

    /// 创建司机
    ///
    /// # 返回
    /// - Ok: 新司机 ID 与最终坐标
    /// - Err(ValidationError): 字段校验失败
    /// - Err(Duplicate): 姓名 / 手机 / 车牌已被占用
    pub fn create_driver(&self, input: &DriverInput) -> ApiResult<DriverCreatedResponse> {
        let driver = self.prepare(input)?;

        let driver_id = self
            .driver_repo
            .insert(&driver)
            .map_err(|e| self.map_write_error(e, &driver, None))?;

        info!(driver_id, vehicle = %driver.vehicle_details, "司机已创建");
        Ok(DriverCreatedResponse {
            message: "Driver added successfully".to_string(),
            driver_id,
            coordinates: Coordinates {
                latitude: driver.latitude,
                longitude: driver.longitude,
            },
        })
    }

    /// 更新司机
    ///
    /// # 说明
    /// - 写库前先检查其他司机的占用情况，给出最具体的冲突提示
    /// - 唯一索引仍是最终裁决（并发写入时由其兜底）
    pub fn update_driver(&self, id: i64, input: &DriverInput) -> ApiResult<DriverUpdatedResponse> {
        let driver = self.prepare(input)?;

        let conflicts = self.driver_repo.find_conflicts(
            &driver.full_name,
            &driver.phone_number,
            &driver.vehicle_details,
            Some(id),
        )?;
        if let Some(msg) = conflict_message(&conflicts) {
            return Err(ApiError::Duplicate(msg.to_string()));
        }

        let affected = self
            .driver_repo
            .update(id, &driver)
            .map_err(|e| self.map_write_error(e, &driver, Some(id)))?;
        if affected == 0 {
            return Err(ApiError::NotFound("Driver not found".to_string()));
        }

        info!(driver_id = id, "司机已更新");
        Ok(DriverUpdatedResponse {
            message: "Driver updated successfully".to_string(),
            coordinates: Coordinates {
                latitude: driver.latitude,
                longitude: driver.longitude,
            },
        })
    }

    /// 删除司机（名下有包裹时拒绝）
    pub fn delete_driver(&self, id: i64) -> ApiResult<MessageResponse> {
        let assigned = self.driver_repo.count_assigned_parcels(id)?;
        if assigned > 0 {
            return Err(ApiError::BusinessRuleViolation(
                MSG_DRIVER_HAS_PARCELS.to_string(),
            ));
        }

        if self.driver_repo.delete(id)? == 0 {
            return Err(ApiError::NotFound("Driver not found".to_string()));
        }

        info!(driver_id = id, "司机已删除");
        Ok(MessageResponse::new("Driver deleted successfully"))
    }

    /// 校验 + 规范化
    fn prepare(&self, input: &DriverInput) -> ApiResult<NewDriver> {
        let errors = self.validator.validate_driver_input(input);
        if !errors.is_empty() {
            return Err(ApiError::ValidationError(errors.join(", ")));
        }

        let (latitude, longitude) = self
            .coordinates
            .ensure_valid(input.latitude.as_deref(), input.longitude.as_deref());

        Ok(NewDriver {
            full_name: self
                .cleaner
                .clean_text(input.full_name.as_deref().unwrap_or_default()),
            phone_number: self
                .cleaner
                .digits_only(input.phone_number.as_deref().unwrap_or_default()),
            vehicle_details: self
                .cleaner
                .normalize_plate(input.vehicle_details.as_deref().unwrap_or_default()),
            is_active: input.active_flag(),
            latitude,
            longitude,
        })
    }

    /// 写库失败映射
    ///
    /// 唯一索引冲突时按列给出提示；无法从约束消息判断时重新查询占用情况
    fn map_write_error(
        &self,
        err: RepositoryError,
        driver: &NewDriver,
        exclude_id: Option<i64>,
    ) -> ApiError {
        if !matches!(err, RepositoryError::UniqueConstraintViolation(_)) {
            return err.into();
        }

        let by_column = if err.is_unique_violation_on("drivers.vehicle_details") {
            Some(MSG_DUPLICATE_VEHICLE)
        } else if err.is_unique_violation_on("drivers.phone_number") {
            Some(MSG_DUPLICATE_PHONE)
        } else if err.is_unique_violation_on("drivers.full_name") {
            Some(MSG_DUPLICATE_NAME)
        } else {
            None
        };
        if let Some(msg) = by_column {
            return ApiError::Duplicate(msg.to_string());
        }

        warn!(error = %err, "司机唯一约束冲突列无法识别，重新检查占用情况");
        let msg = self
            .driver_repo
            .find_conflicts(
                &driver.full_name,
                &driver.phone_number,
                &driver.vehicle_details,
                exclude_id,
            )
            .ok()
            .and_then(|c| conflict_message(&c))
            .unwrap_or(MSG_DUPLICATE_DRIVER);
        ApiError::Duplicate(msg.to_string())
    }
}

/// 冲突提示（车牌 > 手机 > 姓名）
pub fn conflict_message(conflicts: &DriverConflicts) -> Option<&'static str> {
    if conflicts.vehicle {
        Some(MSG_DUPLICATE_VEHICLE)
    } else if conflicts.phone {
        Some(MSG_DUPLICATE_PHONE)
    } else if conflicts.name {
        Some(MSG_DUPLICATE_NAME)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_priority() {
        let all = DriverConflicts {
            name: true,
            phone: true,
            vehicle: true,
        };
        assert_eq!(conflict_message(&all), Some(MSG_DUPLICATE_VEHICLE));

        let name_and_phone = DriverConflicts {
            name: true,
            phone: true,
            vehicle: false,
        };
        assert_eq!(conflict_message(&name_and_phone), Some(MSG_DUPLICATE_PHONE));

        let name_only = DriverConflicts {
            name: true,
            ..Default::default()
        };
        assert_eq!(conflict_message(&name_only), Some(MSG_DUPLICATE_NAME));
        assert_eq!(conflict_message(&DriverConflicts::default()), None);
    }
}
