pub mod clock;
pub mod led;
pub mod spi;
pub mod usart;

pub use clock::TickClock;
pub use led::Led;
pub use spi::ChipSelect;
pub use spi::SpiBus;
pub use usart::Usart;
