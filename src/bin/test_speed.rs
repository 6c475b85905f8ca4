use env_logger::Builder;
use log::LevelFilter;
use rand::Rng;

use radiocmd::command::{Arg, ArgKind, Registry};
use radiocmd::frame::FrameCodec;
use radiocmd::protocol::MAX_ARGS;

/// A random value of `kind`, or `None` for an empty slot.
fn random_arg(rng: &mut impl Rng, kind: ArgKind) -> Option<Arg> {
    return match kind {
        ArgKind::None => None,
        ArgKind::Int8 => Some(Arg::Int8(rng.gen())),
        ArgKind::UInt8 => Some(Arg::UInt8(rng.gen())),
        ArgKind::UInt16 => Some(Arg::UInt16(rng.gen())),
        ArgKind::Float32 => Some(Arg::Float32(rng.gen())),
    };
}

fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let registry = Registry::standard();
    let codec = FrameCodec::new(registry);
    let mut rng = rand::thread_rng();

    let start = std::time::Instant::now();
    let duration = std::time::Duration::from_secs(1);
    let mut frames: u64 = 0;
    let mut wire_bytes: u64 = 0;
    let mut corrected: u64 = 0;

    let commands = registry.commands();
    let mut args = [Arg::UInt8(0); MAX_ARGS];

    loop {
        if start.elapsed() >= duration {
            break;
        }

        let command = &commands[rng.gen_range(0..commands.len())];
        let mut count = 0;
        for kind in command.signature {
            if let Some(arg) = random_arg(&mut rng, *kind) {
                args[count] = arg;
                count += 1;
            }
        }

        let mut wire = match codec.encode(rng.gen(), command, &args[..count]) {
            Ok(frame) => frame,
            Err(err) => {
                log::error!("encode failed: {}", err);
                break;
            }
        };

        let bit = rng.gen_range(0..wire.len() * 8);
        wire.bytes[bit / 8] ^= 1 << (bit % 8);

        if let Ok(decoded) = codec.decode(&wire) {
            frames += 1;
            wire_bytes += decoded.len as u64;
            corrected += decoded.corrected as u64;
        }
    }

    println!("{} frames/second ({} corrected bits)", frames, corrected);
    print_throughput(wire_bytes);
}

fn print_throughput(bytes: u64) {
    match () {
        _ if bytes >= 1_000_000 => println!("{:.2} mb/s", bytes as f64 / 1_000_000.0),
        _ if bytes >= 1_000 => println!("{:.2} kb/s", bytes as f64 / 1_000.0),
        _ => println!("{:.2} b/s", bytes as f64),
    }
}
