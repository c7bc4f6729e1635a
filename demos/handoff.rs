use lib::counter::AtomicCounter;
use lib::flag::VisibleFlag;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WORKERS: u32 = 2;
const WRITES_PER_WORKER: u32 = 50_000;

fn main() {
    {
        let counter = Arc::new(AtomicCounter::new());

        let writers = (0..WORKERS)
            .map(|idx| {
                let counter = counter.clone();
                thread::spawn(move || {
                    println!("#{} Increment Worker started", idx);
                    let mut i = 0;
                    while i < WRITES_PER_WORKER {
                        counter.increment();
                        i += 1;
                    }

                    println!("#{} Increment Worker finished!", idx);
                })
            })
            .collect::<Vec<_>>();

        writers
            .into_iter()
            .for_each(|handle| handle.join().unwrap());

        println!("Final count: {}", counter.read());
    }

    {
        let flag = Arc::new(VisibleFlag::new());

        let writer = {
            let flag = flag.clone();
            thread::spawn(move || {
                println!("Writer started");
                thread::sleep(Duration::from_secs(1));
                flag.set(true);
                println!("Writer finished!");
            })
        };

        let reader = {
            let flag = flag.clone();
            thread::spawn(move || {
                println!("Reader started");
                let mut polls: u64 = 0;
                while !flag.get() {
                    polls += 1;
                }
                println!("Reader finished!. Polls: {}", polls);
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
