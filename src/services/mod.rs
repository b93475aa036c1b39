pub mod path_service;
pub mod render_service;
pub mod search_service;
pub mod tree_service;

pub use path_service::PathService;
pub use render_service::RenderService;
pub use search_service::SearchService;
pub use tree_service::TreeService;
