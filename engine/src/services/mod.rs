// Engine services: the chart session and the pure pieces it drives.
pub mod chart_session;
pub mod lookup;
pub mod pagination;

pub use chart_session::{ChartEvent, ChartSession, RenderFrame};
pub use lookup::{Metrics, PriceSummary};
pub use pagination::{LogicalRange, PaginationState};
