//! Board services for the bootstrap sequence

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};

use voltlog_core::boot::{BootPlatform, SpawnError};
use voltlog_core::config::LoggerConfig;
use voltlog_core::traits::{BatteryMonitor, SensorError};
use voltlog_drivers::sensor::BatteryDivider;
use voltlog_drivers::storage::{FixedTimeSource, SdStorage};
use voltlog_hal::storage::StorageSetup;
use voltlog_hal_rp2040::{RpAdcReader, SdBlockDevice};

use crate::tasks;

/// Battery sensor fitted to this board
pub type BoardSensor = BatteryDivider<RpAdcReader>;

/// Log storage fitted to this board
pub type BoardStorage = SdStorage<SdBlockDevice, FixedTimeSource>;

/// Resources the bootstrap stages act on
///
/// Owns the sensor and storage until `CreateTasks` moves them into the
/// sampler task.
pub struct BoardBoot {
    spawner: Spawner,
    startup_delay: Duration,
    setup: StorageSetup,
    sensor: Option<BoardSensor>,
    storage: Option<BoardStorage>,
}

impl BoardBoot {
    pub fn new(
        spawner: Spawner,
        config: &LoggerConfig,
        sensor: BoardSensor,
        storage: BoardStorage,
    ) -> Self {
        Self {
            spawner,
            startup_delay: Duration::from_millis(u64::from(config.boot.startup_delay_ms)),
            setup: config.storage.setup(),
            sensor: Some(sensor),
            storage: Some(storage),
        }
    }
}

impl BootPlatform for BoardBoot {
    async fn startup_delay(&mut self) {
        debug!("Waiting {} ms for the board to settle", self.startup_delay.as_millis());
        Timer::after(self.startup_delay).await;
    }

    async fn setup_sensor(&mut self) -> Result<(), SensorError> {
        let sensor = self.sensor.as_mut().ok_or(SensorError::NotInitialized)?;
        sensor.init().await?;
        info!("Battery sensor initialized");
        Ok(())
    }

    fn spawn_sampler(&mut self) -> Result<(), SpawnError> {
        let (Some(sensor), Some(storage)) = (self.sensor.take(), self.storage.take()) else {
            return Err(SpawnError::MissingResources);
        };

        self.spawner
            .spawn(tasks::sampler_task(sensor, storage, self.setup.clone()))
            .map_err(|_| SpawnError::Busy)
    }
}
