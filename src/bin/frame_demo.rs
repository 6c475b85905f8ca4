use env_logger::Builder;
use log::LevelFilter;

use radiocmd::command::{Arg, Registry};
use radiocmd::frame::FrameCodec;
use radiocmd::ground_station::to_hex;

const ADDRESS: u16 = 0x1234;
const FLIP_BIT: usize = 13;

fn main() {
    Builder::new()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    let registry = Registry::standard();
    let codec = FrameCodec::new(registry);

    let status = match registry.by_name("STATUS") {
        Ok(command) => command,
        Err(err) => {
            log::error!("{}", err);
            return;
        }
    };

    let mut wire = match codec.encode(ADDRESS, status, &[Arg::UInt8(0x7F)]) {
        Ok(frame) => frame,
        Err(err) => {
            log::error!("encode failed: {}", err);
            return;
        }
    };

    println!("Encoded message ({} bytes): {}", wire.len(), to_hex(&wire));

    wire.bytes[FLIP_BIT / 8] ^= 1 << (FLIP_BIT % 8);
    println!("After flipping bit {}:      {}", FLIP_BIT, to_hex(&wire));

    match codec.decode(&wire) {
        Ok(decoded) => {
            let message = decoded.message;
            println!("Address: {:04X}", message.address);
            println!("Command: \"{}\"", message.command.name);
            for (i, arg) in message.args.iter().enumerate() {
                println!("Argument {}: {:?}", i + 1, arg);
            }
            println!("Corrected errors: {}", decoded.corrected);
        }
        Err(err) => log::error!("decode failed: {}", err),
    }
}
