pub mod freepik;

pub use freepik::FreepikClient;
