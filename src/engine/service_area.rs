// ==========================================
// 包裹派送管理后台 - 司机坐标保障
// ==========================================
// 规则: 坐标缺失/无法解析/落在服务区域外 → 在区域内随机生成
// 精度: 6 位小数
// ==========================================

use crate::domain::driver::ServiceArea;
use crate::importer::data_cleaner::DataCleaner;
use rand::Rng;
use tracing::debug;

/// 坐标小数位
const COORDINATE_DECIMALS: i32 = 6;

fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_DECIMALS);
    (value * factor).round() / factor
}

// ==========================================
// CoordinateAssigner - 司机坐标分配器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CoordinateAssigner {
    area: ServiceArea,
}

impl Default for CoordinateAssigner {
    fn default() -> Self {
        Self::new(ServiceArea::CHENNAI)
    }
}

impl CoordinateAssigner {
    pub fn new(area: ServiceArea) -> Self {
        Self { area }
    }

    pub fn area(&self) -> ServiceArea {
        self.area
    }

    /// 区域内随机坐标
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> (f64, f64) {
        let lat = rng.gen_range(self.area.min_lat..=self.area.max_lat);
        let lng = rng.gen_range(self.area.min_lng..=self.area.max_lng);
        (
            round_coordinate(lat).clamp(self.area.min_lat, self.area.max_lat),
            round_coordinate(lng).clamp(self.area.min_lng, self.area.max_lng),
        )
    }

    /// 保证司机坐标有效
    ///
    /// # 参数
    /// - latitude / longitude: 入参原值（可能缺失或为文本）
    ///
    /// # 返回
    /// - 区域内的原坐标，或新生成的随机坐标
    pub fn ensure_valid(&self, latitude: Option<&str>, longitude: Option<&str>) -> (f64, f64) {
        let cleaner = DataCleaner;
        let lat = cleaner.parse_optional_number(latitude);
        let lng = cleaner.parse_optional_number(longitude);

        match (lat, lng) {
            (Some(lat), Some(lng)) if self.area.contains(lat, lng) => (lat, lng),
            _ => {
                let (lat, lng) = self.random_point(&mut rand::thread_rng());
                debug!(latitude = lat, longitude = lng, "为司机生成服务区域内坐标");
                (lat, lng)
            }
        }
    }
}
