//! Shared fixtures: a two-line plant with a general area

use linecrew_core::{Task, Worker, WorkerId};

const FAMILIES: [&str; 6] = [
    "plasma",
    "coating_feed",
    "coating_unload",
    "leak_test",
    "form_fold",
    "coil",
];

/// 31 worker slots over 29 tasks
pub fn plant_catalog() -> Vec<Task> {
    let mut tasks = Vec::new();
    for line in ["line2", "line3"] {
        for family in &FAMILIES[..5] {
            tasks.push(Task::new(format!("{line}_{family}_1st_half"), 1));
            tasks.push(Task::new(format!("{line}_{family}_2nd_half"), 1));
        }
        tasks.push(Task::new(format!("{line}_coil"), 2));
    }
    for family in ["tote_cleaning", "ipm", "cml"] {
        tasks.push(Task::new(format!("{family}_1st_half"), 1));
        tasks.push(Task::new(format!("{family}_2nd_half"), 1));
    }
    tasks.push(Task::new("print_and_apply", 1));
    tasks
}

/// Sixteen workers, each signed off for three line families and two
/// general-area families
pub fn plant_roster() -> Vec<Worker> {
    (0..16u32)
        .map(|i| {
            let k = i as usize;
            let general: [&str; 2] = if i % 2 == 0 {
                ["ipm", "cml"]
            } else {
                ["tote_cleaning", "print_and_apply"]
            };
            Worker::new(101 + i, format!("Worker {}", 101 + i))
                .qualify(FAMILIES[k % 6])
                .qualify(FAMILIES[(k + 1) % 6])
                .qualify(FAMILIES[(k + 3) % 6])
                .qualify_all(general)
        })
        .collect()
}

pub fn ids(workers: &[Worker]) -> Vec<WorkerId> {
    workers.iter().map(|w| w.id).collect()
}
