#![no_main]

use arbitrary::Arbitrary;
use buddy_sim::BuddyAllocator;
use libfuzzer_sys::fuzz_target;

const MAX_REGION: usize = 1 << 20;
const MAX_REQUEST: usize = 1 << 21;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Allocate(usize),
    Deallocate(usize),
}

#[derive(Clone, Debug, Arbitrary)]
struct Args {
    total_size: usize,
    ops: Vec<Op>,
}

fuzz_target!(|args: Args| {
    let mut sim = match BuddyAllocator::try_new(args.total_size % MAX_REGION) {
        Ok(sim) => sim,
        Err(_) => return,
    };

    let mut outstanding = Vec::new();

    for op in args.ops {
        match op {
            Op::Allocate(size) => {
                if let Ok(addr) = sim.allocate(size % MAX_REQUEST) {
                    outstanding.push(addr);
                }
            }

            Op::Deallocate(index) => {
                if outstanding.is_empty() {
                    continue;
                }

                let addr = outstanding.swap_remove(index % outstanding.len());
                sim.deallocate(addr)
                    .expect("failed to deallocate an outstanding address");

                check_buddy_invariant(&sim);
            }
        }

        check_partition(&sim);
    }
});

/// Blocks must tile `[0, total_size)` with no gaps or overlaps.
fn check_partition(sim: &BuddyAllocator) {
    let mut expected = 0;
    for block in sim.blocks() {
        assert_eq!(block.start(), expected);
        expected += block.size();
    }
    assert_eq!(expected, sim.total_size());
}

/// No two adjacent free blocks may have equal size after a deallocation.
fn check_buddy_invariant(sim: &BuddyAllocator) {
    for pair in sim.blocks().windows(2) {
        assert!(!(pair[0].is_free() && pair[1].is_free() && pair[0].size() == pair[1].size()));
    }
}
