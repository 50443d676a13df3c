use criterion::{criterion_group, criterion_main, Criterion};

use ocho::{
    devices::{NullDisplay, NullKeyboard},
    timer::NoCallback,
    Machine,
};

/// a tight arithmetic loop: count V0 up with a carry into V1, then jump
/// back to the start
const LOOP_ROM: &[u8] = &[
    0x70, 0x01, // ADD V0, 0x01
    0x80, 0x14, // ADD V0, V1
    0xC2, 0xFF, // RND V2, 0xFF
    0x12, 0x00, // JP 0x200
];

fn setup_machine() -> Machine<NullDisplay, NullKeyboard, NoCallback> {
    let mut machine = Machine::new(NullDisplay, NullKeyboard, NoCallback);
    machine
        .load_rom(&mut &LOOP_ROM[..])
        .expect("the rom always fits");
    machine
}

pub fn cycle_bench(c: &mut Criterion) {
    let mut machine = setup_machine();
    c.bench_function("cycle_bench", |b| {
        b.iter(|| {
            machine.tick().expect("the loop rom never faults");
        });
    });
}

pub fn disassemble_bench(c: &mut Criterion) {
    let machine = setup_machine();
    c.bench_function("disassemble_bench", |b| {
        b.iter(|| {
            let mut sink = Vec::with_capacity(0x8000);
            machine.disassemble(&mut sink).expect("writing to a vec");
            sink
        });
    });
}

criterion_group!(benches, cycle_bench, disassemble_bench);
criterion_main!(benches);
