/* Copyright 2020 @TwoCookingMice */

use crate::math::constants::Float;

use exr::prelude::*;

// Write EXR Image to file
pub fn write_exr_to_file(image: &[(Float, Float, Float)],
                         width: usize,
                         height: usize,
                         file_path: &str) {
    log::info!("Starting writing openexr images: {}.", file_path);

    let write_result = write_rgb_file(file_path, width, height, |x, y| {
        (
            image[y * width + x].0,
            image[y * width + x].1,
            image[y * width + x].2,
        )
    });
    match write_result {
        Ok(()) => println!("EXR written to: {}.", file_path),
        Err(e) => println!("EXR written error: {}.", e.to_string()),
    }
}
