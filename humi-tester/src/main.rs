use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use clap::{Parser, ValueEnum};
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};
use linux_embedded_hal::{Delay, I2cdev};
use sensirion_ht::{HumidityTemperatureSensor, Mode, Sht4xBuilder, Shtc3Builder};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Sensor {
    /// SHT40, SHT41, SHT43, SHT45
    Sht4x,
    /// SHTC3, with sleep between reads
    Shtc3,
}

/// Poll a Sensirion humidity and temperature sensor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// Sensor family
    #[arg(short, long, value_enum, default_value_t = Sensor::Sht4x)]
    sensor: Sensor,
    /// Bus address in hex, defaults to the sensor's own
    #[arg(short, long, value_parser = parse_hex)]
    address: Option<u8>,
    /// SHT4x measurement command in hex (e.g., fd, 39)
    #[arg(short, long, value_parser = parse_hex)]
    mode: Option<u8>,
    /// SHTC3 low power measurements
    #[arg(long, default_value_t = false)]
    low_power: bool,
    /// Time between reads in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    interval: u64,
    /// Stop after this many reads
    #[arg(short, long)]
    count: Option<usize>,
}

fn parse_hex(s: &str) -> Result<u8, std::num::ParseIntError> {
    u8::from_str_radix(s.trim_start_matches("0x"), 16)
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    log::info!("Arguments: {args:#?}");
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, stopping...");
            running.store(false, Ordering::Relaxed);
        })
        .expect("Error setting Ctrl-C handler");
    }

    log::info!("[HUM] Opening bus: {}", args.path);
    let mut i2c = I2cdev::new(&args.path).expect("Failed to open I2C device");
    let mut delay = Delay;

    match args.sensor {
        Sensor::Sht4x => {
            let mut builder = Sht4xBuilder::default();
            if let Some(address) = args.address {
                builder = builder.with_address(address);
            }
            let mut sht = match builder.build(&mut i2c, &mut delay) {
                Ok(sht) => sht,
                Err(e) => {
                    log::error!("[HUM] Could not reset SHT4x: {e:?}");
                    std::process::exit(1);
                }
            };
            if let Some(command) = args.mode {
                if let Err(e) = sht.set_mode_raw(command) {
                    log::error!("[HUM] Invalid mode 0x{:02x}, expected one of:", e.0);
                    for info in Mode::TABLE.iter() {
                        log::error!("[HUM]   0x{:02x}: {}", info.command, info.label);
                    }
                    std::process::exit(1);
                }
            }
            log::info!("[HUM] Sensor 0x{:02x}: {}", sht.address(), sht.mode());
            poll(&mut sht, &mut i2c, &mut delay, &args, &running);
        }
        Sensor::Shtc3 => {
            let mut builder = Shtc3Builder::default().with_low_power(args.low_power);
            if let Some(address) = args.address {
                builder = builder.with_address(address);
            }
            let mut shtc = match builder.build(&mut i2c, &mut delay) {
                Ok(shtc) => shtc,
                Err(e) => {
                    log::error!("[HUM] Could not reset SHTC3: {e:?}");
                    std::process::exit(1);
                }
            };
            poll(&mut shtc, &mut i2c, &mut delay, &args, &running);
            if !shtc.sleeping() {
                if let Err(e) = shtc.set_sleeping(&mut i2c, &mut delay, true) {
                    log::warn!(
                        "[HUM] Sensor 0x{:02x}: Could not sleep: {e:?}",
                        shtc.address()
                    );
                }
            }
        }
    }
    log::info!("[HUM] Exiting.")
}

fn poll<S, T, D>(dev: &mut S, i2c: &mut T, delay: &mut D, args: &Args, running: &AtomicBool)
where
    S: HumidityTemperatureSensor,
    T: I2c<SevenBitAddress>,
    D: DelayNs,
{
    let addr = dev.address();
    match dev.serial_number(i2c, delay) {
        Ok(serial) => log::info!("[HUM] Sensor 0x{addr:02x}: serial {serial:#010x}"),
        Err(e) => log::warn!("[HUM] Sensor 0x{addr:02x}: Could not read serial: {e:?}"),
    }

    let interval = Duration::from_millis(args.interval);
    let mut reads = 0usize;
    while running.load(Ordering::Relaxed) && args.count.is_none_or(|count| reads < count) {
        let start = Instant::now();
        match dev.measurements(i2c, delay) {
            Ok(m) => log::info!(
                "[HUM] Sensor 0x{addr:02x}: {:.2} C, {:.2}%",
                m.celsius(),
                m.humidity()
            ),
            Err(e) => log::warn!("[HUM] Sensor 0x{addr:02x}: Error reading: {e:?}"),
        }
        reads += 1;
        log::debug!(
            "[HUM] Read sensor in {:.2} ms.",
            start.elapsed().as_secs_f64() * 1000.0
        );
        if let Some(rest) = interval.checked_sub(start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}
