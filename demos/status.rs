use mcstatus::{Conf, McsErr};

fn main() -> Result<(), McsErr> {
    let conf = Conf::create("mc.hypixel.net");
    let (status, ping) = conf.get_status()?;

    println!("{} in {}ms", status, ping.as_millis());
    println!("{}", String::from_utf8_lossy(&status.serialize_modern()?));

    Ok(())
}
