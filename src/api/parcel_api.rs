// ==========================================
// 包裹派送管理后台 - 包裹管理 API
// ==========================================
// 职责: 包裹列表、增删改、指派/取消指派、状态流转、批量指派
// 状态规则:
//   - unassigned: 同时清空司机
//   - assigned / in_transit / completed: 必须已有司机
//   - pending: 直接更新
// 唯一性: 包裹手机号全表唯一（写前预检 + 唯一索引兜底）
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::{AffectedResponse, MessageResponse};
use crate::domain::parcel::{NewParcel, ParcelInput, ParcelListItem};
use crate::domain::types::ParcelStatus;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::record_validator::RecordValidator;
use crate::repository::driver_repo::DriverRepository;
use crate::repository::error::RepositoryError;
use crate::repository::parcel_repo::ParcelRepository;

pub const MSG_DUPLICATE_PARCEL_PHONE: &str = "A parcel with this phone number already exists";
pub const MSG_DRIVER_UNAVAILABLE: &str = "Driver not found or inactive";

/// 后台操作员 ID（指派日志 assigned_by）
const ADMIN_OPERATOR_ID: i64 = 1;

/// 创建包裹响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelCreatedResponse {
    pub message: String,
    pub parcel_id: i64,
}

/// 指派请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignRequest {
    pub driver_id: Option<i64>,
}

/// 状态更新请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

/// 批量指派请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkAssignRequest {
    pub parcel_ids: Option<Vec<i64>>,
    pub driver_id: Option<i64>,
}

/// 状态无法在没有司机时设置的提示
pub fn driver_required_message(status: ParcelStatus) -> String {
    format!(
        "Cannot set status to \"{}\" without a driver. Please assign a driver first.",
        status.display_label()
    )
}

// ==========================================
// ParcelApi - 包裹管理 API
// ==========================================
pub struct ParcelApi {
    parcel_repo: Arc<ParcelRepository>,
    driver_repo: Arc<DriverRepository>,
    validator: RecordValidator,
    cleaner: DataCleaner,
}

impl ParcelApi {
    pub fn new(parcel_repo: Arc<ParcelRepository>, driver_repo: Arc<DriverRepository>) -> Self {
        Self {
            parcel_repo,
            driver_repo,
            validator: RecordValidator::new(),
            cleaner: DataCleaner,
        }
    }

    /// 包裹列表（新建在前，附司机姓名）
    pub fn list_parcels(&self) -> ApiResult<Vec<ParcelListItem>> {
        Ok(self.parcel_repo.list_with_driver()?)
    }

    /// 创建包裹
    ///
    /// # 返回
    /// - Err(ValidationError): 七个字段任一不合法
    /// - Err(Duplicate): 手机号已存在
    /// - Err(BusinessRuleViolation): 新包裹没有司机，不能直接进入需要司机的状态
    pub fn create_parcel(&self, input: &ParcelInput) -> ApiResult<ParcelCreatedResponse> {
        let parcel = self.prepare(input)?;

        if parcel.status.requires_driver() {
            return Err(ApiError::BusinessRuleViolation(driver_required_message(
                parcel.status,
            )));
        }
        if self.parcel_repo.phone_exists(&parcel.phone_number, None)? {
            return Err(ApiError::Duplicate(MSG_DUPLICATE_PARCEL_PHONE.to_string()));
        }

        let parcel_id = self
            .parcel_repo
            .insert(&parcel)
            .map_err(map_parcel_write_error)?;

        info!(parcel_id, "包裹已创建");
        Ok(ParcelCreatedResponse {
            message: "Parcel added successfully".to_string(),
            parcel_id,
        })
    }

    /// 更新包裹
    ///
    /// # 说明
    /// - 手机号预检排除自身
    /// - 状态为 unassigned 时同时清空司机
    pub fn update_parcel(&self, id: i64, input: &ParcelInput) -> ApiResult<MessageResponse> {
        let parcel = self.prepare(input)?;

        let existing = self
            .parcel_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound("Parcel not found".to_string()))?;

        if parcel.status.requires_driver() && existing.assigned_driver_id.is_none() {
            return Err(ApiError::BusinessRuleViolation(driver_required_message(
                parcel.status,
            )));
        }
        if self.parcel_repo.phone_exists(&parcel.phone_number, Some(id))? {
            return Err(ApiError::Duplicate(MSG_DUPLICATE_PARCEL_PHONE.to_string()));
        }

        let affected = self
            .parcel_repo
            .update(id, &parcel)
            .map_err(map_parcel_write_error)?;
        if affected == 0 {
            return Err(ApiError::NotFound("Parcel not found".to_string()));
        }

        info!(parcel_id = id, status = %parcel.status, "包裹已更新");
        Ok(MessageResponse::new("Parcel updated successfully"))
    }

    pub fn delete_parcel(&self, id: i64) -> ApiResult<MessageResponse> {
        if self.parcel_repo.delete(id)? == 0 {
            return Err(ApiError::NotFound("Parcel not found".to_string()));
        }
        info!(parcel_id = id, "包裹已删除");
        Ok(MessageResponse::new("Parcel deleted successfully"))
    }

    /// 指派司机（司机必须存在且在岗），状态置为 assigned
    ///
    /// 指派日志写入失败只记录告警，不影响指派结果
    pub fn assign_parcel(&self, parcel_id: i64, request: &AssignRequest) -> ApiResult<MessageResponse> {
        let driver_id = request
            .driver_id
            .ok_or_else(|| ApiError::InvalidInput("Driver ID is required".to_string()))?;
        self.require_active_driver(driver_id)?;

        if self.parcel_repo.assign_driver(parcel_id, driver_id)? == 0 {
            return Err(ApiError::NotFound("Parcel not found".to_string()));
        }

        if let Err(e) = self
            .parcel_repo
            .log_assignment(parcel_id, driver_id, ADMIN_OPERATOR_ID)
        {
            warn!(parcel_id, driver_id, error = %e, "指派日志写入失败");
        }

        info!(parcel_id, driver_id, "包裹已指派");
        Ok(MessageResponse::new(
            "Driver assigned successfully and status set to assigned",
        ))
    }

    /// 取消指派：清空司机，状态回到 unassigned
    pub fn unassign_parcel(&self, parcel_id: i64) -> ApiResult<MessageResponse> {
        if self.parcel_repo.unassign(parcel_id)? == 0 {
            return Err(ApiError::NotFound("Parcel not found".to_string()));
        }
        info!(parcel_id, "包裹已取消指派");
        Ok(MessageResponse::new("Driver unassigned successfully"))
    }

    /// 更新包裹状态
    pub fn update_parcel_status(
        &self,
        parcel_id: i64,
        request: &StatusRequest,
    ) -> ApiResult<MessageResponse> {
        let raw = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::InvalidInput("Status is required".to_string()))?;
        let status = ParcelStatus::parse(raw)
            .ok_or_else(|| ApiError::InvalidInput("Invalid status".to_string()))?;

        let parcel = self
            .parcel_repo
            .find_by_id(parcel_id)?
            .ok_or_else(|| ApiError::NotFound("Parcel not found".to_string()))?;

        if status.requires_driver() && parcel.assigned_driver_id.is_none() {
            return Err(ApiError::BusinessRuleViolation(driver_required_message(
                status,
            )));
        }

        self.parcel_repo.update_status(parcel_id, status)?;
        info!(parcel_id, status = %status, "包裹状态已更新");

        let message = if status == ParcelStatus::Unassigned {
            "Parcel status updated and driver unassigned"
        } else {
            "Parcel status updated successfully"
        };
        Ok(MessageResponse::new(message))
    }

    /// 批量指派
    ///
    /// # 返回
    /// - 受影响行数（不存在的包裹 ID 不计入）
    pub fn bulk_assign(&self, request: &BulkAssignRequest) -> ApiResult<AffectedResponse> {
        let (parcel_ids, driver_id) = match (&request.parcel_ids, request.driver_id) {
            (Some(ids), Some(driver_id)) if !ids.is_empty() => (ids, driver_id),
            _ => {
                return Err(ApiError::InvalidInput(
                    "Invalid parcel IDs or driver ID".to_string(),
                ))
            }
        };
        self.require_active_driver(driver_id)?;

        let affected = self.parcel_repo.bulk_assign(parcel_ids, driver_id)?;
        info!(driver_id, requested = parcel_ids.len(), affected, "批量指派完成");

        Ok(AffectedResponse {
            message: format!("{} parcels assigned successfully", affected),
            affected,
        })
    }

    fn require_active_driver(&self, driver_id: i64) -> ApiResult<()> {
        match self.driver_repo.find_active(driver_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::BusinessRuleViolation(
                MSG_DRIVER_UNAVAILABLE.to_string(),
            )),
        }
    }

    /// 校验 + 规范化
    fn prepare(&self, input: &ParcelInput) -> ApiResult<NewParcel> {
        let errors = self.validator.validate_parcel_input(input);
        if !errors.is_empty() {
            return Err(ApiError::ValidationError(errors.join(", ")));
        }

        let status = match input.status.as_deref().map(str::trim) {
            None | Some("") => ParcelStatus::Unassigned,
            Some(raw) => ParcelStatus::parse(raw)
                .ok_or_else(|| ApiError::InvalidInput("Invalid status".to_string()))?,
        };

        let text = |v: &Option<String>| self.cleaner.clean_text(v.as_deref().unwrap_or_default());
        Ok(NewParcel {
            customer_name: text(&input.customer_name),
            phone_number: self
                .cleaner
                .digits_only(input.phone_number.as_deref().unwrap_or_default()),
            weight: self.cleaner.parse_optional_number(input.weight.as_deref()),
            pin_code: Some(
                self.cleaner
                    .digits_only(input.pin_code.as_deref().unwrap_or_default()),
            ),
            address: text(&input.address),
            latitude: self.cleaner.parse_optional_number(input.latitude.as_deref()),
            longitude: self.cleaner.parse_optional_number(input.longitude.as_deref()),
            status,
        })
    }
}

/// 包裹写库失败映射：手机号唯一冲突 → 统一提示
fn map_parcel_write_error(err: RepositoryError) -> ApiError {
    if err.is_unique_violation_on("parcels.phone_number") {
        ApiError::Duplicate(MSG_DUPLICATE_PARCEL_PHONE.to_string())
    } else if matches!(err, RepositoryError::UniqueConstraintViolation(_)) {
        ApiError::Duplicate("This parcel already exists (duplicate information)".to_string())
    } else {
        err.into()
    }
}
