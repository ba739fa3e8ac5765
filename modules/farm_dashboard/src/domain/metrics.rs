use rand::Rng;

use crate::contract::model::{DashboardMetrics, Farm, WeatherSnapshot};

/// Source of the dashboard's headline figures. Only `total_area` is derived
/// from real data in [`SimulatedMetrics`]; a real implementation can replace
/// it without touching record synchronization.
pub trait MetricsProvider: Send + Sync + 'static {
    fn farm_metrics(&self, farms: &[Farm]) -> DashboardMetrics;
    /// Estimated productivity for one farm, kg/ha.
    fn farm_productivity(&self, farm: &Farm) -> f64;
    fn weather(&self) -> WeatherSnapshot;
}

/// Randomised placeholder figures.
#[derive(Debug, Clone, Default)]
pub struct SimulatedMetrics;

const WEATHER_ALERTS: u32 = 2;
const ACTIVE_PROJECTS: u32 = 3;

impl MetricsProvider for SimulatedMetrics {
    fn farm_metrics(&self, farms: &[Farm]) -> DashboardMetrics {
        if farms.is_empty() {
            return DashboardMetrics {
                weather_alerts: WEATHER_ALERTS,
                active_projects: ACTIVE_PROJECTS,
                ..DashboardMetrics::default()
            };
        }

        let total_area: f64 = farms.iter().map(|f| f.area).sum();
        let mut rng = rand::rng();
        DashboardMetrics {
            total_area,
            avg_productivity: (rng.random_range(500.0..1000.0_f64) * 100.0).round() / 100.0,
            total_revenue: (total_area * rng.random_range(5000.0..10000.0_f64)).round(),
            total_costs: (total_area * rng.random_range(1000.0..3000.0_f64)).round(),
            weather_alerts: WEATHER_ALERTS,
            active_projects: ACTIVE_PROJECTS,
        }
    }

    fn farm_productivity(&self, _farm: &Farm) -> f64 {
        rand::rng().random_range(500.0..1000.0_f64).round()
    }

    fn weather(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 28.0,
            humidity: 75.0,
            wind_speed: 12.0,
            rain_chance: 30.0,
        }
    }
}
