#[cfg(all(feature = "log", target_os = "none"))]
mod port {
    use lazy_static::lazy_static;
    use spin::Mutex;
    use uart_16550::SerialPort;

    lazy_static! {
        pub static ref SERIAL1: Mutex<SerialPort> = {
            let mut serial_port = unsafe { SerialPort::new(0x3F8) };
            serial_port.init();
            Mutex::new(serial_port)
        };
    }

    pub fn send_line(serial: &mut SerialPort, msg: &str) {
        for byte in msg.bytes() {
            serial.send(byte);
        }
        serial.send(b'\r');
        serial.send(b'\n');
    }
}

#[cfg(all(feature = "log", target_os = "none"))]
pub fn write(msg: &str) {
    crate::irq::without_interrupts(|| {
        let mut serial = port::SERIAL1.lock();
        port::send_line(&mut serial, msg);
    });
}

/// Interrupt-safe variant: drops the message if the port is busy.
#[cfg(all(feature = "log", target_os = "none"))]
pub fn write_try(msg: &str) {
    let Some(mut serial) = port::SERIAL1.try_lock() else {
        return;
    };
    port::send_line(&mut serial, msg);
}

#[cfg(not(all(feature = "log", target_os = "none")))]
pub fn write(_msg: &str) {}

#[cfg(not(all(feature = "log", target_os = "none")))]
pub fn write_try(_msg: &str) {}
