pub mod answering;
pub mod history;

pub use answering::HttpAnsweringAdapter;
pub use history::HttpHistoryAdapter;
