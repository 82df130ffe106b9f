// ==========================================
// 包裹派送管理后台 - 路线分组引擎
// ==========================================
// 规则: 按 [4, 3, 3] 循环切分，末尾不足一组也单独成组
// 红线: 纯位置切分，不重排、不做地理优化
// ==========================================
// 输入: 司机名下包裹（按创建时间升序）
// 输出: RouteGroup 列表（编号 1 起，颜色按编号循环取调色板）
// ==========================================

use crate::domain::parcel::Parcel;
use crate::domain::route::RouteGroup;
use tracing::instrument;

/// 分组大小循环模式
pub const ROUTE_SIZE_PATTERN: [usize; 3] = [4, 3, 3];

/// 路线颜色调色板（按路线编号循环）
pub const ROUTE_PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57", "#FF9FF3", "#54A0FF", "#5F27CD",
    "#00D2D3", "#FF9F43",
];

/// 路线颜色：(id - 1) mod 10
pub fn route_color(route_id: usize) -> &'static str {
    ROUTE_PALETTE[route_id.saturating_sub(1) % ROUTE_PALETTE.len()]
}

// ==========================================
// RoutePartitioner - 路线分组器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct RoutePartitioner;

impl RoutePartitioner {
    pub fn new() -> Self {
        Self
    }

    /// 切分路线
    ///
    /// # 参数
    /// - parcels: 已按创建时间升序排列的包裹
    ///
    /// # 返回
    /// - 空输入返回空列表
    #[instrument(skip(self, parcels), fields(count = parcels.len()))]
    pub fn partition(&self, parcels: Vec<Parcel>) -> Vec<RouteGroup> {
        let mut routes: Vec<RouteGroup> = Vec::new();
        let mut remaining = parcels.into_iter().peekable();

        let mut sizes = ROUTE_SIZE_PATTERN.iter().cycle();
        while remaining.peek().is_some() {
            let size = sizes.next().copied().unwrap_or(ROUTE_SIZE_PATTERN[0]);
            let chunk: Vec<Parcel> = remaining.by_ref().take(size).collect();

            let route_id = routes.len() + 1;
            let total_weight: f64 = chunk.iter().map(|p| p.weight.unwrap_or(0.0)).sum();
            routes.push(RouteGroup {
                route_id,
                route_name: format!("Route {}", route_id),
                route_color: route_color(route_id).to_string(),
                parcel_count: chunk.len(),
                parcels: chunk,
                total_weight,
            });
        }

        routes
    }
}
