use mcstatus::{Conf, McsErr, ServerStatus};

fn main() -> Result<(), McsErr> {
    // What a 1.4 - 1.6 server answers, and what a pre 1.4 server answers.
    let status = ServerStatus::from_legacy_message("§1\x0061\x001.5.2\x00§aA Server\x003\x0020")?;

    println!("{}", status);
    println!("{:?}", status.to_legacy_message(39));

    let conf = Conf::create("localhost:25565");
    let (status, _) = conf.get_legacy_status()?;

    println!("{}", status);

    Ok(())
}
