pub mod bar;
pub mod bar_series;
pub mod bar_table;
pub mod request_params;
pub mod spot;
pub mod timeframe;
