//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `serial`       | SerialLink         | LD06 UART (`serialport`)    |
//! | `replay`       | SerialLink         | Recorded capture file       |
//! | `artnet`       | LightingSink       | Art-Net node over UDP       |
//! | `event_queue`  | EventSink          | Drop directory via forwarder|
//! | `log_sink`     | EventSink          | Logger (dry run)            |
//! |                | LightingSink       |                             |
//! | `config_file`  | ConfigPort         | JSON file                   |
//! | `time`         | Clock              | `std::time::Instant`        |

pub mod artnet;
pub mod config_file;
pub mod event_queue;
pub mod log_sink;
pub mod replay;
#[cfg(feature = "cli")]
pub mod serial;
pub mod time;
