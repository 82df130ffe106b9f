// ==========================================
// 包裹派送管理后台 - 包裹导入 Repository Trait
// ==========================================
// 职责: 定义导入管道所需的数据访问接口（不包含业务逻辑）
// 实现者: ParcelRepository（rusqlite，经 spawn_blocking 执行）；测试中可替换为内存实现
// ==========================================

use crate::domain::parcel::NewParcel;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::parcel_repo::ParcelRepository;
use async_trait::async_trait;
use std::collections::HashSet;

// ==========================================
// ParcelImportRepository Trait
// ==========================================
#[async_trait]
pub trait ParcelImportRepository: Send + Sync {
    /// 加载全部已存手机号（规范化 10 位）
    ///
    /// # 返回
    /// - Err: 存储不可用（整批致命）
    async fn load_existing_phones(&self) -> RepositoryResult<HashSet<String>>;

    /// 写入单条包裹（每行独立，互不回滚）
    ///
    /// # 返回
    /// - Ok(i64): 新包裹 ID
    /// - Err(UniqueConstraintViolation): 手机号被并发写入抢占
    async fn insert_parcel(&self, parcel: NewParcel) -> RepositoryResult<i64>;
}

/// 在阻塞线程池中执行同步仓储调用
async fn run_blocking<T, F>(call: F) -> RepositoryResult<T>
where
    F: FnOnce() -> RepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| RepositoryError::InternalError(format!("任务执行失败: {}", e)))?
}

#[async_trait]
impl ParcelImportRepository for ParcelRepository {
    async fn load_existing_phones(&self) -> RepositoryResult<HashSet<String>> {
        let repo = self.clone();
        run_blocking(move || repo.list_phone_numbers()).await
    }

    async fn insert_parcel(&self, parcel: NewParcel) -> RepositoryResult<i64> {
        let repo = self.clone();
        run_blocking(move || repo.insert(&parcel)).await
    }
}
