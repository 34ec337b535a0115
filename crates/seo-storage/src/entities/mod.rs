pub mod analysis;

pub use analysis::{
    ActiveModel as AnalysisActiveModel, Column as AnalysisColumn, Entity as Analysis,
    Model as AnalysisModel,
};
