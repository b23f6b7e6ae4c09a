use spritebin::{BinPacker, BinShape, Item};

fn main() {
    env_logger::init();

    for &shape in &[BinShape::Square, BinShape::Tall, BinShape::Wide] {
        let mut items: Vec<_> = (0..5).map(|_| Item::new((128, 128))).collect();

        let packer = BinPacker::new().shape(shape);
        let tree = packer.pack(&mut items).expect("128px items can't overflow");

        println!("{} pack result: {:#?}", shape, tree.map(|tree| tree.size()));
        println!("{:#?}", items);
    }
}
