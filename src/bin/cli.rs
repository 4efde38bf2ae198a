use anyhow::{anyhow, bail, Context};
use boothcam::{
    native_backend, CameraConfig, CaptureSession, ConfigStore, DeviceDescriptor, DeviceEvent,
    Resolution,
};
use std::env;

const USAGE: &str = "Usage: boothcam-cli <command> [args]

Commands:
  list-devices [--json]
  list-resolutions <device> [--json]
  snap [device] [--resolution WxH]
  record [device] [--seconds N]
  watch [--seconds N]
  config show
  config reset";

fn main() -> anyhow::Result<()> {
    boothcam::init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    }

    let command = &args[1];
    match command.as_str() {
        "list-devices" => cmd_list_devices(&args),
        "list-resolutions" => cmd_list_resolutions(&args),
        "snap" => cmd_snap(&args),
        "record" => cmd_record(&args),
        "watch" => cmd_watch(&args),
        "config" => cmd_config(&args),
        "--help" | "-h" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

fn cmd_list_devices(args: &[String]) -> anyhow::Result<()> {
    let backend = native_backend();
    let devices = backend.enumerate()?;
    if args.contains(&"--json".to_string()) {
        println!("{}", serde_json::to_string(&devices)?);
    } else if devices.is_empty() {
        println!("No cameras found ({})", backend.name());
    } else {
        for d in devices {
            if d.location.is_empty() {
                println!("{}: {}", d.id, d.name);
            } else {
                println!("{}: {} [{}]", d.id, d.name, d.location);
            }
        }
    }
    Ok(())
}

fn cmd_list_resolutions(args: &[String]) -> anyhow::Result<()> {
    if args.len() < 3 {
        eprintln!("Usage: boothcam-cli list-resolutions <device> [--json]");
        std::process::exit(1);
    }

    let backend = native_backend();
    let device = find_device(&backend.enumerate()?, &args[2])?;
    let camera = backend.open(&device, 30)?;
    let resolutions = camera.supported_resolutions()?;

    if args.contains(&"--json".to_string()) {
        println!("{}", serde_json::to_string(&resolutions)?);
    } else {
        for r in resolutions {
            println!("{}", r);
        }
    }
    Ok(())
}

fn cmd_snap(args: &[String]) -> anyhow::Result<()> {
    // Parse args: snap [device] [--resolution WxH]
    let mut device = None;
    let mut resolution = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--resolution" => {
                i += 1;
                let value = args.get(i).ok_or_else(|| anyhow!("--resolution needs WxH"))?;
                resolution = Some(value.parse::<Resolution>().map_err(|e| anyhow!(e))?);
            }
            other => device = Some(other.to_string()),
        }
        i += 1;
    }

    let mut session = open_session(device.as_deref())?;
    if let Some(resolution) = resolution {
        session.set_resolution(resolution)?;
    }

    // Let auto exposure settle before keeping a frame
    for _ in 0..10 {
        session.process_frame()?;
    }
    let path = session.take_photo()?;
    println!("{}", path.display());

    session.stop_camera();
    session.save_config()?;
    Ok(())
}

#[cfg(feature = "recording")]
fn cmd_record(args: &[String]) -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    // Parse args: record [device] [--seconds N]
    let mut device = None;
    let mut seconds = 10u64;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--seconds" => {
                i += 1;
                seconds = args
                    .get(i)
                    .ok_or_else(|| anyhow!("--seconds needs a value"))?
                    .parse()
                    .context("invalid --seconds")?;
            }
            other => device = Some(other.to_string()),
        }
        i += 1;
    }

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::SeqCst))?;

    let mut session = open_session(device.as_deref())?;
    let path = session
        .start_recording()?
        .ok_or_else(|| anyhow!("camera is not ready to record"))?;
    eprintln!("Recording to {} (Ctrl-C to stop)", path.display());

    let limit = Duration::from_secs(seconds);
    while !stop.load(Ordering::SeqCst) && session.recording_elapsed() < limit {
        session.process_frame()?;
        if !session.is_recording() {
            bail!("recording stopped: recorder is {}", session.recorder_state());
        }
    }

    match session.stop_recording()? {
        Some(stats) => println!(
            "{} ({} frames, {:.1}s)",
            stats.output_path.display(),
            stats.video_frames,
            stats.duration_secs
        ),
        None => bail!("no recording was active"),
    }

    session.stop_camera();
    session.save_config()?;
    Ok(())
}

#[cfg(not(feature = "recording"))]
fn cmd_record(_args: &[String]) -> anyhow::Result<()> {
    bail!("boothcam-cli was built without the `recording` feature")
}

/// Print hot-plug events until the time runs out or Ctrl-C
fn cmd_watch(args: &[String]) -> anyhow::Result<()> {
    use boothcam::platform::DeviceMonitor;
    use std::sync::Arc;
    use std::time::Duration;

    let seconds: u64 = match args.iter().position(|a| a == "--seconds") {
        Some(i) => args
            .get(i + 1)
            .ok_or_else(|| anyhow!("--seconds needs a value"))?
            .parse()
            .context("invalid --seconds")?,
        None => 60,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let monitor = DeviceMonitor::new(Arc::from(native_backend()));
        monitor.start_monitoring().await?;
        for d in monitor.get_active_devices().await {
            println!("present: {} ({})", d.id, d.name);
        }

        let deadline = tokio::time::sleep(Duration::from_secs(seconds));
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = tokio::signal::ctrl_c() => break,
                event = monitor.wait_for_event() => match event {
                    Some(DeviceEvent::Connected(id)) => println!("connected: {}", id),
                    Some(DeviceEvent::Disconnected(id)) => println!("disconnected: {}", id),
                    None => break,
                },
            }
        }

        monitor.stop_monitoring().await?;
        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_config(args: &[String]) -> anyhow::Result<()> {
    let store = ConfigStore::default_location();
    match args.get(2).map(String::as_str) {
        Some("show") => {
            let config = store.parse_config();
            println!("# {}", store.path().display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Some("reset") => {
            store.save_config(&CameraConfig::default())?;
            println!("Reset {}", store.path().display());
        }
        _ => {
            eprintln!("Usage: boothcam-cli config <show|reset>");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn find_device(devices: &[DeviceDescriptor], key: &str) -> anyhow::Result<DeviceDescriptor> {
    devices
        .iter()
        .find(|d| d.matches(key))
        .cloned()
        .ok_or_else(|| anyhow!("no camera matches '{}'", key))
}

/// Session streaming from `device`, or from the remembered camera
fn open_session(device: Option<&str>) -> anyhow::Result<CaptureSession> {
    let mut session = CaptureSession::native(ConfigStore::default_location());
    match device {
        Some(key) => {
            let descriptor = find_device(session.registry().devices(), key)?;
            session.start_camera(&descriptor)?;
        }
        None => session.start()?,
    }
    Ok(session)
}
